//! Procedural macros for jrmt
//!
//! # Available Macros
//!
//! ## `#[remote_interface]` - Typed Remote Procedures
//!
//! Declares a remote service as a Rust trait and generates a proxy that
//! invokes its procedures through an `RpcSession`:
//! - Arguments are converted to positional parameters with serde
//! - Results are converted back with `serde_json::from_value`
//! - Methods without a return value are sent as notifications
//!
//! Procedure names and arities are fixed at compile time, so no runtime
//! lookup of the trait is involved.
//!
//! # Examples
//!
//! ```ignore
//! use jrmt::remote_interface;
//!
//! #[remote_interface]
//! pub trait Calculator {
//!     fn add(&self, a: i64, b: i64) -> i64;
//!
//!     #[rpc(name = "system.log")]
//!     fn log(&self, line: String);
//! }
//!
//! let calculator = CalculatorProxy::new(&session);
//! let sum = calculator.add(1, 2).await?;
//! calculator.log("added".to_string()).await?;
//! ```
//!
//! Generated code refers to `::jrmt_client` and `::jrmt_core`, so both must be
//! dependencies of the crate using the attribute.

mod remote_interface;

use proc_macro::TokenStream;
use syn::{parse_macro_input, ItemTrait};

/// Attribute macro generating a typed proxy for a remote service
///
/// Applied to `trait Foo`, it keeps the trait and adds:
///
/// - `FooProxy<'a>`: wraps `jrmt_client::RemoteProxy<'a>`, with `new(&session)`
///   and one `async fn` per trait method returning `jrmt_core::Result<T>`
/// - `impl jrmt_client::RemoteInterface for FooProxy<'_>` listing every
///   method's `MethodSignature`
///
/// # Method Mapping
///
/// - The receiver (`&self`) is dropped; every other argument becomes a
///   positional parameter and must implement `serde::Serialize`
/// - A return type `T` must implement `serde::de::DeserializeOwned`; the
///   method is invoked as a call
/// - No return type, or `()`, makes the method a notification
/// - `#[rpc(name = "wire.name")]` overrides the procedure name, which
///   otherwise is the method name
///
/// # Limitations
///
/// - The trait may only contain methods
/// - Neither the trait nor its methods can be generic
#[proc_macro_attribute]
pub fn remote_interface(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let item = parse_macro_input!(item as ItemTrait);
    remote_interface::remote_interface_impl(item)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
