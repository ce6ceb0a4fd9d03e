use thiserror::Error;

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("Config error: {0}")]
    Config(String),
}
