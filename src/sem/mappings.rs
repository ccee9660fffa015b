//! Core-library to target-runtime type mapping
//!
//! The map mirrors the runtime's bridging of the source language's core
//! types onto native classes. Both simple and fully qualified source names
//! resolve, since the front end may hand the pipeline either form.

use once_cell::sync::Lazy;
use std::collections::HashMap;

pub static TARGET_TYPE_MAP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut map = HashMap::new();
    map.insert("Object", "NSObject");
    map.insert("java.lang.Object", "NSObject");
    map.insert("Class", "IOSClass");
    map.insert("java.lang.Class", "IOSClass");
    map.insert("Cloneable", "NSCopying");
    map.insert("java.lang.Cloneable", "NSCopying");
    map.insert("String", "NSString");
    map.insert("java.lang.String", "NSString");
    map.insert("Number", "NSNumber");
    map.insert("java.lang.Number", "NSNumber");
    map.insert("CharSequence", "JavaLangCharSequence");
    map.insert("java.lang.CharSequence", "JavaLangCharSequence");
    map.insert("Throwable", "JavaLangThrowable");
    map.insert("java.lang.Throwable", "JavaLangThrowable");
    map
});

/// Target runtime name for a source core-library type, if it is mapped.
pub fn target_type(source_name: &str) -> Option<&'static str> {
    TARGET_TYPE_MAP.get(source_name).copied()
}
