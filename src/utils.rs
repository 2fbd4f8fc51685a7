//! # Utility Functions Module
//!
//! Small helpers shared by the command builders.

/// Builds a `Vec<String>` of command-line arguments from mixed values.
///
/// Every item only needs to implement `ToString`, so literals, numbers and
/// owned filter strings can sit side by side.
///
/// # Example
/// ```rust
/// use mov2gif::args;
///
/// let fps = 15;
/// let filter = format!("fps={}", fps);
/// let args = args!["-vf", filter, "-loop", 0];
/// assert_eq!(args, vec!["-vf", "fps=15", "-loop", "0"]);
/// ```
#[macro_export]
macro_rules! args {
    [$($item:expr),* $(,)?] => {
        ::std::vec![$(::std::string::ToString::to_string(&$item)),*]
    };
}
