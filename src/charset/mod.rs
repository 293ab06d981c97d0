/// Charset conversion with substitution of unmappable characters.
pub mod converter;
/// Strict, candidate-restricted charset detection.
pub mod detector;
/// Case-insensitive charset labels and candidate lists.
pub mod label;
/// Detect/convert/score orchestration for rows, outbound values and error messages.
pub mod normalizer;
/// Readability scoring used to rank candidate decodings.
pub mod scorer;
