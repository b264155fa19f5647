//! Template assembly and rendering.
//!
//! - [`Assembler`]: walks the directory convention and compiles every unit
//! - [`Bundle`]: the immutable result, looked up by view or email key
//! - [`Functions`] / [`Namespace`]: the globals every template can call
//! - [`CompiledUnit`]: one executable view or email
//! - [`Summary`]: optional static analysis export

mod analysis;
mod assembler;
mod bundle;
mod functions;
mod unit;

pub use analysis::Summary;
pub use assembler::{parse, Assembler};
pub use bundle::Bundle;
pub use functions::{Functions, Namespace};
pub use unit::{CompiledUnit, Document};
