//! libxslt engine adapter (Native-XSLT)
//!
//! Drives the platform's libxslt directly through its C bindings, so that a
//! stylesheet libxslt rejects is reported instead of dereferenced, and the
//! result is serialized by libxslt itself, honoring `xsl:output` (method,
//! declaration, indentation). `document()` lookups go through libxslt's
//! default loader, resolved against the process working directory.

use std::ffi::{c_void, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;

use libxml::parser::Parser;
use libxslt::bindings::{
    xmlChar, xmlDocPtr, xmlFree, xmlFreeDoc, xmlReadMemory, xsltApplyStylesheet,
    xsltFreeStylesheet, xsltParseStylesheetDoc, xsltSaveResultToString, xsltStylesheetPtr,
};
use xform_engine_traits::{newline, EngineError, EngineKind, ParameterSet, Result, TransformEngine};

use crate::stylesheet;
use crate::xml::xpath_string_literal;

/// Base URL handed to libxslt for relative `document()` and `xsl:include` lookups
fn base_url() -> String {
    std::env::current_dir()
        .map(|dir| dir.join("stylesheet.xsl").to_string_lossy().into_owned())
        .unwrap_or_else(|_| "stylesheet.xsl".to_string())
}

/// A compiled stylesheet; owns the stylesheet document as well
struct CompiledStylesheet(xsltStylesheetPtr);

impl Drop for CompiledStylesheet {
    fn drop(&mut self) {
        // SAFETY: the pointer came from a successful xsltParseStylesheetDoc
        // and is freed exactly once here.
        unsafe { xsltFreeStylesheet(self.0) }
    }
}

/// A transformation result document
struct ResultDocument(xmlDocPtr);

impl Drop for ResultDocument {
    fn drop(&mut self) {
        // SAFETY: non-null result of xsltApplyStylesheet, owned by us.
        unsafe { xmlFreeDoc(self.0) }
    }
}

fn compile(text: &str) -> Result<CompiledStylesheet> {
    let url = CString::new(base_url()).map_err(|e| EngineError::compile_raw(e.to_string()))?;
    let len = c_int::try_from(text.len())
        .map_err(|_| EngineError::compile_raw("Stylesheet is too large"))?;

    // SAFETY: buffer and length describe `text`, which outlives the call;
    // the URL is a valid NUL-terminated string.
    let doc = unsafe {
        xmlReadMemory(
            text.as_ptr() as *const c_char,
            len,
            url.as_ptr(),
            ptr::null(),
            0,
        )
    };
    if doc.is_null() {
        return Err(EngineError::compile_raw("libxml2 could not parse the stylesheet"));
    }

    // SAFETY: `doc` is a freshly parsed document. On success the stylesheet
    // takes ownership of it; on failure it is still ours to free.
    let style = unsafe { xsltParseStylesheetDoc(doc) };
    if style.is_null() {
        unsafe { xmlFreeDoc(doc) };
        return Err(EngineError::compile_raw("libxslt rejected the stylesheet"));
    }
    Ok(CompiledStylesheet(style))
}

/// Parameter name/value C strings, values quoted as XPath literals since
/// libxslt evaluates them as expressions
fn parameter_strings(params: &ParameterSet) -> Result<Vec<CString>> {
    let mut strings = Vec::new();
    for param in params.bound() {
        let name = CString::new(param.name.trim())
            .map_err(|_| EngineError::execution(format!("Parameter name '{}' contains NUL", param.name)))?;
        let value = CString::new(xpath_string_literal(&param.value))
            .map_err(|_| EngineError::execution(format!("Value of parameter '{}' contains NUL", param.name)))?;
        strings.push(name);
        strings.push(value);
    }
    Ok(strings)
}

/// Serialize `result` the way `xsl:output` of `style` asks for
fn serialize(result: &ResultDocument, style: &CompiledStylesheet) -> Result<String> {
    let mut buf: *mut xmlChar = ptr::null_mut();
    let mut len: c_int = 0;

    // SAFETY: both pointers are live for the duration of the call; libxslt
    // allocates `buf` with xmlMalloc.
    let rc = unsafe { xsltSaveResultToString(&mut buf, &mut len, result.0, style.0) };
    if rc != 0 {
        return Err(EngineError::execution("libxslt could not serialize the result"));
    }
    if buf.is_null() {
        return Ok(String::new());
    }

    let len = usize::try_from(len).unwrap_or(0);
    // SAFETY: libxslt wrote `len` bytes at `buf`; copied before freeing.
    let bytes = unsafe { std::slice::from_raw_parts(buf, len) }.to_vec();
    unsafe {
        if let Some(free) = xmlFree {
            free(buf as *mut c_void);
        }
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// libxslt engine wrapper
pub struct LibxsltEngine;

impl Default for LibxsltEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LibxsltEngine {
    pub fn new() -> Self {
        Self
    }
}

impl TransformEngine for LibxsltEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::NativeXslt
    }

    fn name(&self) -> &'static str {
        "libxslt"
    }

    fn transform(&self, input: &str, transform: &str, params: &ParameterSet) -> Result<String> {
        stylesheet::precompile(transform)?;
        libxslt::register_exslt();
        let style = compile(transform)?;

        stylesheet::check_input(input)?;
        let source = Parser::default()
            .parse_string(input)
            .map_err(|e| EngineError::invalid_input(format!("Failed to parse input: {:?}", e)))?;

        let strings = parameter_strings(params)?;
        let mut pointers: Vec<*const c_char> = strings.iter().map(|s| s.as_ptr()).collect();
        pointers.push(ptr::null());

        // SAFETY: the stylesheet and source document are live and owned by
        // this call; the parameter array is NUL-terminated and its strings
        // outlive the call.
        let result = unsafe { xsltApplyStylesheet(style.0, source.doc_ptr(), pointers.as_mut_ptr()) };
        if result.is_null() {
            return Err(EngineError::execution("libxslt failed to apply the stylesheet"));
        }
        let result = ResultDocument(result);

        let output = serialize(&result, &style)?;
        Ok(newline::normalize(newline::strip_bom(&output)))
    }
}
