use thiserror::Error;

#[derive(Error, Debug)]
pub enum NerdGraphError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("graphql error: {0}")]
    Graph(String),

    #[error("mutation response carried no update payload")]
    MissingData,
}
