//! WGSL compile and link checks.
//!
//! Shaders are parsed and validated on the CPU with `naga` before any GPU
//! object is created, so a broken source yields a readable diagnostic
//! instead of a device error.

use std::fmt;

use super::backend::VertexLayout;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn to_naga(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Where a shader diagnostic was produced.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderPhase {
    Compile(ShaderStage),
    Link,
}

/// Compiler or linker diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderDiagnostic {
    pub phase: ShaderPhase,
    pub message: String,
}

impl ShaderDiagnostic {
    pub(crate) fn compile(stage: ShaderStage, msg: impl Into<String>) -> Self {
        Self { phase: ShaderPhase::Compile(stage), message: non_empty(msg.into()) }
    }

    pub(crate) fn link(msg: impl Into<String>) -> Self {
        Self { phase: ShaderPhase::Link, message: non_empty(msg.into()) }
    }
}

fn non_empty(message: String) -> String {
    if message.trim().is_empty() {
        "unknown shader error".to_string()
    } else {
        message
    }
}

impl fmt::Display for ShaderDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.phase {
            ShaderPhase::Compile(stage) => {
                write!(f, "error compiling {stage} shader:\n{}", self.message)
            }
            ShaderPhase::Link => write!(f, "error linking shader program: {}", self.message),
        }
    }
}

impl std::error::Error for ShaderDiagnostic {}

/// Every diagnostic produced while building one program.
///
/// Both stages are compiled before giving up, so a broken vertex and a broken
/// fragment source yield two entries. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderBuildError {
    diagnostics: Vec<ShaderDiagnostic>,
}

impl ShaderBuildError {
    pub(crate) fn new(first: ShaderDiagnostic, rest: impl IntoIterator<Item = ShaderDiagnostic>) -> Self {
        let mut diagnostics = vec![first];
        diagnostics.extend(rest);
        Self { diagnostics }
    }

    pub fn diagnostics(&self) -> &[ShaderDiagnostic] {
        &self.diagnostics
    }

    pub fn phases(&self) -> Vec<ShaderPhase> {
        self.diagnostics.iter().map(|d| d.phase).collect()
    }
}

impl From<ShaderDiagnostic> for ShaderBuildError {
    fn from(diag: ShaderDiagnostic) -> Self {
        Self::new(diag, [])
    }
}

impl fmt::Display for ShaderBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diag) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{diag}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ShaderBuildError {}

/// Facts about a successfully compiled stage needed for linking.
#[derive(Debug, Clone, PartialEq)]
pub struct StageInfo {
    pub stage: ShaderStage,
    pub entry_point: String,
    /// `@location(n)` inputs consumed by the entry point, ascending.
    pub input_locations: Vec<u32>,
}

/// Parses and validates `source`, then locates the entry point for `stage`.
pub fn compile_stage(stage: ShaderStage, source: &str) -> Result<StageInfo, ShaderDiagnostic> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| ShaderDiagnostic::compile(stage, e.emit_to_string(source)))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::default(),
    );
    validator
        .validate(&module)
        .map_err(|e| ShaderDiagnostic::compile(stage, e.emit_to_string(source)))?;

    let Some(entry) = module.entry_points.iter().find(|ep| ep.stage == stage.to_naga()) else {
        return Err(ShaderDiagnostic::compile(
            stage,
            format!("no @{stage} entry point found"),
        ));
    };

    let mut input_locations = Vec::new();
    for arg in &entry.function.arguments {
        match &arg.binding {
            Some(binding) => push_location(&mut input_locations, binding),
            None => {
                if let naga::TypeInner::Struct { members, .. } = &module.types[arg.ty].inner {
                    for binding in members.iter().filter_map(|m| m.binding.as_ref()) {
                        push_location(&mut input_locations, binding);
                    }
                }
            }
        }
    }
    input_locations.sort_unstable();

    Ok(StageInfo {
        stage,
        entry_point: entry.name.clone(),
        input_locations,
    })
}

fn push_location(out: &mut Vec<u32>, binding: &naga::Binding) {
    if let naga::Binding::Location { location, .. } = binding {
        out.push(*location);
    }
}

/// Checks that `vertex` and `fragment` form a program fed by `layout`.
pub fn link_stages(
    vertex: &StageInfo,
    fragment: &StageInfo,
    layout: &VertexLayout,
) -> Result<(), ShaderDiagnostic> {
    if vertex.stage != ShaderStage::Vertex {
        return Err(ShaderDiagnostic::link(format!(
            "expected a vertex stage, got a {} stage",
            vertex.stage
        )));
    }
    if fragment.stage != ShaderStage::Fragment {
        return Err(ShaderDiagnostic::link(format!(
            "expected a fragment stage, got a {} stage",
            fragment.stage
        )));
    }

    let missing: Vec<String> = vertex
        .input_locations
        .iter()
        .filter(|loc| !layout.provides_location(**loc))
        .map(|loc| loc.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(ShaderDiagnostic::link(format!(
            "vertex inputs at location(s) {} have no matching vertex attribute",
            missing.join(", ")
        )));
    }

    Ok(())
}
