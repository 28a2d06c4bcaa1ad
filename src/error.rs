pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A removal was attempted on a list with no elements.
    #[error("list is empty")]
    Empty,
}
