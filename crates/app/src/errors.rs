//! Error classification shared by the cart and checkout flows.

/// How an error should be presented to the shopper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad local input, shown inline and blocking the action.
    Validation,

    /// A remote call failed and was rolled back or left the flow unchanged.
    RemoteFailure,

    /// A referenced resource (promotion code, item) does not exist.
    NotFound,

    /// The shopper tried to check out with nothing selected.
    EmptySelection,
}

/// Copy shown when a failure carries no shopper-facing message.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";
