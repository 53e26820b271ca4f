//! Integration flows across the Lintas components.

#[cfg(test)]
mod fixtures;

mod concurrency;
mod gateway;
mod lifecycle;
