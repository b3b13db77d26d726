pub mod server;

use secrecy::SecretString;

#[derive(Debug)]
pub enum Action {
    Server(ServerArgs),
}

#[derive(Debug)]
pub struct ServerArgs {
    pub port: u16,
    pub dsn: String,
    pub secret: SecretString,
    pub base_url: String,
}
