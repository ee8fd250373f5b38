use thiserror::Error;

/// Precondition violations raised by the fixed-point and Q96 math.
///
/// These signal a broken caller contract (a zero denominator, an out-of-domain
/// tick), not bad user input. User input is rejected earlier through quotes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("denominator must be greater than zero")]
    DivisionByZero,
    #[error("tick out of range: {0}")]
    TickOutOfRange(i32),
    #[error("sqrtPriceX96 out of range: {0}")]
    SqrtRatioOutOfRange(String),
    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),
    #[error("amount must not be negative")]
    NegativeAmount,
    #[error("amount too large for {0} price update")]
    PriceUpdateOverflow(&'static str),
    #[error("invalid swap state")]
    InvalidSwapState,
}

/// Failure of the strict scaled-decimal parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixedParseError {
    #[error("not a decimal number: {0:?}")]
    Malformed(String),
    #[error("decimal number out of range: {0:?}")]
    Overflow(String),
}
