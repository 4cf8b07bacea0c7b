//! Type-capability queries over opaque type descriptors.
//!
//! Parameter types are carried verbatim from the spec text (`int`,
//! `Set<int>`, `Map<int, int>`). Nothing downstream parses them ad hoc;
//! classification happens here, once, and unknown base types are treated
//! as non-collection scalars.

/// Capability classification of a base type name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeClass {
    Scalar,
    Text,
    SetLike,
    MapLike,
}

impl TypeClass {
    pub fn is_collection(&self) -> bool {
        matches!(self, TypeClass::SetLike | TypeClass::MapLike)
    }
}

/// The base type name: the part before any generic-argument marker.
pub fn base_type(descriptor: &str) -> &str {
    match descriptor.find('<') {
        Some(idx) => &descriptor[..idx],
        None => descriptor,
    }
}

/// Classify a base type name. Unknown names are non-collection scalars.
pub fn classify(base: &str) -> TypeClass {
    match base {
        "int" | "long" | "short" | "byte" | "char" | "bool" | "boolean" | "double" | "float" => {
            TypeClass::Scalar
        }
        "string" | "String" => TypeClass::Text,
        "Set" | "HashSet" | "TreeSet" | "LinkedHashSet" | "List" | "ArrayList" | "LinkedList"
        | "Collection" | "Queue" | "Deque" => TypeClass::SetLike,
        "Map" | "HashMap" | "TreeMap" | "LinkedHashMap" => TypeClass::MapLike,
        _ => TypeClass::Scalar,
    }
}

/// Whether a full descriptor names a collection type.
pub fn is_collection(descriptor: &str) -> bool {
    classify(base_type(descriptor)).is_collection()
}

/// Generic arguments of a descriptor, split at top-level commas.
/// `Map<int, Set<int>>` yields `["int", "Set<int>"]`.
pub fn generic_args(descriptor: &str) -> Vec<&str> {
    let open = match descriptor.find('<') {
        Some(idx) => idx,
        None => return Vec::new(),
    };
    let close = match descriptor.rfind('>') {
        Some(idx) if idx > open => idx,
        _ => return Vec::new(),
    };

    let inner = &descriptor[open + 1..close];
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, ch) in inner.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                args.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    let last = inner[start..].trim();
    if !last.is_empty() {
        args.push(last);
    }
    args
}

/// Element type of a set-like descriptor, or the key type of a map-like one.
pub fn element_type(descriptor: &str) -> Option<&str> {
    generic_args(descriptor).first().copied()
}

/// Value type of a map-like descriptor.
pub fn value_type(descriptor: &str) -> Option<&str> {
    generic_args(descriptor).get(1).copied()
}

/// Boxed host spelling of a scalar/textual base type.
fn boxed(base: &str) -> &str {
    match base {
        "int" => "Integer",
        "long" => "Long",
        "short" => "Short",
        "byte" => "Byte",
        "char" => "Character",
        "bool" | "boolean" => "Boolean",
        "double" => "Double",
        "float" => "Float",
        "string" => "String",
        other => other,
    }
}

/// Host spelling of a base type in non-generic position.
fn host_base(base: &str) -> &str {
    match base {
        "bool" => "boolean",
        "string" => "String",
        other => other,
    }
}

/// Map a descriptor to its host-language type.
/// `int` stays `int`; `bool` becomes `boolean`; generic arguments are
/// boxed, so `Set<int>` becomes `Set<Integer>`.
pub fn host_type(descriptor: &str) -> String {
    if let Some(element) = descriptor.strip_suffix("[]") {
        return format!("{}[]", host_base(element));
    }
    let args = generic_args(descriptor);
    if args.is_empty() {
        return host_base(descriptor).to_string();
    }
    let rendered: Vec<String> = args.iter().map(|a| host_type_boxed(a)).collect();
    format!("{}<{}>", base_type(descriptor), rendered.join(", "))
}

/// Host type in generic position: scalars are boxed.
fn host_type_boxed(descriptor: &str) -> String {
    let args = generic_args(descriptor);
    if args.is_empty() {
        return boxed(descriptor).to_string();
    }
    let rendered: Vec<String> = args.iter().map(|a| host_type_boxed(a)).collect();
    format!("{}<{}>", base_type(descriptor), rendered.join(", "))
}

/// Concrete construction type for a structural snapshot copy of a
/// collection value: `Set<int>` copies via `new HashSet<Integer>(…)`.
/// Non-collection descriptors have no copy constructor.
pub fn copy_constructor(descriptor: &str) -> Option<String> {
    let base = base_type(descriptor);
    let concrete = match classify(base) {
        TypeClass::SetLike => match base {
            "Set" => "HashSet",
            "List" | "Collection" => "ArrayList",
            "Queue" | "Deque" => "ArrayDeque",
            other => other,
        },
        TypeClass::MapLike => match base {
            "Map" => "HashMap",
            other => other,
        },
        TypeClass::Scalar | TypeClass::Text => return None,
    };
    let args = generic_args(descriptor);
    if args.is_empty() {
        return Some(concrete.to_string());
    }
    let rendered: Vec<String> = args.iter().map(|a| host_type_boxed(a)).collect();
    Some(format!("{}<{}>", concrete, rendered.join(", ")))
}
