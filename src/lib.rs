pub mod ast;
pub mod error;
pub mod from_json;
pub mod interpreter;
pub mod json;
pub mod lexer;
pub mod parser;
pub mod product;
pub mod scope;
mod stack;
pub mod token;
pub mod tree;
pub mod value;

use error::InterpretError;
use product::Product;
use scope::Scope;
use tree::SceneGraph;
use value::Value;

pub use from_json::from_json;

// ── Core API ───────────────────────────────────────────────────────

/// The raw outcome of a successful run: the value of the program's last
/// statement and the scene-graph records built along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub value: Value,
    pub product: Product,
}

impl Evaluation {
    /// The nested scene graph, or `None` when no size block ran.
    pub fn scene_graph(&self) -> Option<SceneGraph> {
        SceneGraph::from_product(&self.product)
    }
}

/// Tokenize, parse and evaluate `source` against an empty scope and product.
pub fn run(source: &str) -> Result<Evaluation, InterpretError> {
    let tokens = lexer::tokenize(source)?;
    let program = parser::parse(&tokens)?;
    let mut scope = Scope::new();
    let mut product = Product::new();
    let value = interpreter::evaluate(&program, &mut scope, &mut product)?;
    Ok(Evaluation { value, product })
}

/// The uniform result of `interpret`. On failure only `error` is set; on
/// success `log` holds the program's value and `data` the scene graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    pub success: bool,
    pub error: Option<InterpretError>,
    pub log: Option<Value>,
    pub data: Option<SceneGraph>,
}

impl Output {
    pub fn failure(error: InterpretError) -> Self {
        Output {
            success: false,
            error: Some(error),
            log: None,
            data: None,
        }
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> String {
        json::to_json(self)
    }

    /// Serialize to pretty-printed JSON (2-space indent).
    pub fn to_json_pretty(&self) -> String {
        json::to_json_pretty(self)
    }
}

/// Interpret `source` and fold the result into an `Output`. Never fails:
/// the first error from any stage is reported in `Output::error`.
#[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
pub fn interpret(source: &str) -> Output {
    match run(source) {
        Ok(evaluation) => {
            let data = evaluation.scene_graph();
            Output {
                success: true,
                error: None,
                log: Some(evaluation.value),
                data,
            }
        }
        Err(err) => Output::failure(err),
    }
}

// ── WASM FFI ────────────────────────────────────────────────────────

/// Allocate `len` bytes in WASM memory, returning a pointer (null when
/// `len` is not a valid allocation size).
/// The caller must free the returned pointer with `dealloc(ptr, len)`.
#[no_mangle]
pub extern "C" fn alloc(len: usize) -> *mut u8 {
    match std::alloc::Layout::from_size_align(len, 1) {
        Ok(layout) if len > 0 => unsafe { std::alloc::alloc(layout) },
        _ => std::ptr::null_mut(),
    }
}

/// Free a buffer previously returned by `alloc` or by `wasm_interpret`.
/// For the null-terminated string returned by `wasm_interpret`, pass
/// `strlen(ptr) + 1` as `len`.
///
/// # Safety
/// `ptr` must come from `alloc(len)` or `wasm_interpret` with the same `len`.
#[no_mangle]
pub unsafe extern "C" fn dealloc(ptr: *mut u8, len: usize) {
    if ptr.is_null() || len == 0 {
        return;
    }
    if let Ok(layout) = std::alloc::Layout::from_size_align(len, 1) {
        unsafe { std::alloc::dealloc(ptr, layout) };
    }
}

/// Interpret UTF-8 source and return a pointer to the null-terminated
/// compact JSON of its `Output`.
///
/// # Safety
/// `src_ptr` must point to `src_len` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn wasm_interpret(src_ptr: *const u8, src_len: usize) -> *const u8 {
    let bytes: &[u8] = if src_ptr.is_null() || src_len == 0 {
        &[]
    } else {
        unsafe { std::slice::from_raw_parts(src_ptr, src_len) }
    };
    let input = String::from_utf8_lossy(bytes);
    string_to_c_ptr(interpret(&input).to_json())
}

/// Convert a String to a null-terminated C pointer with exact allocation size.
/// The allocation size is exactly `s.len() + 1` bytes, so the caller can
/// free with `dealloc(ptr, strlen(ptr) + 1)`.
fn string_to_c_ptr(s: String) -> *const u8 {
    let mut bytes = s.into_bytes();
    bytes.push(0);
    // into_boxed_slice guarantees allocation size == bytes.len()
    let boxed = bytes.into_boxed_slice();
    Box::into_raw(boxed) as *mut u8
}

#[cfg(test)]
mod tests;
