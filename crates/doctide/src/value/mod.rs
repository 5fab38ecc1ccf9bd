//! Value representation for runtime values

mod callable;
mod compound;
mod display;
mod future;
mod hashable;
mod impls;
pub mod pretty;

pub use callable::{BuiltinFn, BuiltinFnPtr, ClosureValue, FunctionValue, Receiver};
pub use compound::{RangeValue, StructValue, TypeDef};
pub use future::{FutureState, FutureValue, NativeFuture};
pub use hashable::HashableValue;

use indexmap::IndexMap;
use std::sync::Arc;

/// Runtime value produced by evaluating example code.
///
/// Values are organized into three tiers:
/// - Tier 1: Inline primitives (no allocation)
/// - Tier 2: Heap-allocated compound types (Arc-wrapped, copy-on-write)
/// - Tier 3: Callables, futures and type definitions
///
/// Integers are always `i64` and floats always `f64`; literal suffixes are
/// accepted and ignored. Examples in documentation care about what a value
/// prints as, not about its machine width.
#[derive(Clone)]
pub enum Value {
    // ═══════════════════════════════════════════════════════════════════
    // Tier 1: Inline Primitives
    // ═══════════════════════════════════════════════════════════════════
    /// The unit type `()`
    Unit,

    /// Boolean: `true` or `false`
    Bool(bool),

    /// Unicode scalar value
    Char(char),

    /// Integer of any suffix
    Int(i64),

    /// Floating point of any suffix
    Float(f64),

    // ═══════════════════════════════════════════════════════════════════
    // Tier 2: Heap-Allocated Compound Types
    // ═══════════════════════════════════════════════════════════════════
    /// Heap-allocated string (`String` and `&str` alike)
    String(Arc<String>),

    /// Vectors, arrays and slices
    Vec(Arc<Vec<Value>>),

    /// Tuple (heterogeneous, fixed-size)
    Tuple(Arc<Vec<Value>>),

    /// Insertion-ordered map, printed like a `HashMap`
    Map(Arc<IndexMap<HashableValue, Value>>),

    /// `a..b`, `a..=b`, `a..`
    Range(RangeValue),

    /// Struct instance
    Struct(Arc<StructValue>),

    /// Option<T> - special-cased for ergonomics
    Option(Arc<Option<Value>>),

    /// Result<T, E> - special-cased for ergonomics
    Result(Arc<Result<Value, Value>>),

    // ═══════════════════════════════════════════════════════════════════
    // Tier 3: Callables, Futures, Types
    // ═══════════════════════════════════════════════════════════════════
    /// User-defined function (from syn::ItemFn)
    Function(Arc<FunctionValue>),

    /// Closure with captured environment
    Closure(Arc<ClosureValue>),

    /// Built-in native function
    BuiltinFn(BuiltinFn),

    /// Pending computation, resolved by `.await`
    Future(FutureValue),

    /// A struct definition (usable as a tuple-struct constructor)
    Type(Arc<TypeDef>),
}
