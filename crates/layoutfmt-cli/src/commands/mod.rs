pub mod check;
pub mod declare;
pub mod estimate;
pub mod input;
pub mod parse;

#[cfg(test)]
mod declare_tests;
#[cfg(test)]
mod input_tests;
