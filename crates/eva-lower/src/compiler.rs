use crate::env::{Binding, Environment};
use crate::errors::LowerResult;
use crate::lowering::{Lowering, PRINTF};
use crate::type_resolver::TypeResolver;
use eva_core::verify::verify_module;
use eva_core::{Constant, FunctionBuilder, Module, Signature, Type, Value};
use eva_parser::{parse_program, Expr};
use serde::{Deserialize, Serialize};

/// A module-level `i32` variable created before the program runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalDecl {
    pub name: String,
    pub value: i32,
}

impl GlobalDecl {
    pub fn new(name: impl Into<String>, value: i32) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
    pub module_name: String,
    pub entry_function: String,
    pub globals: Vec<GlobalDecl>,
    /// Reject unknown type names instead of defaulting them to `i32`.
    pub strict_types: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            module_name: "eva".to_string(),
            entry_function: "main".to_string(),
            globals: vec![GlobalDecl::new("VERSION", 42)],
            strict_types: false,
        }
    }
}

impl CompilerOptions {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// `printf(i8*, ...) -> i32`
pub fn printf_signature() -> Signature {
    Signature::new(PRINTF, vec![Type::byte_ptr()], Type::I32).variadic()
}

/// Builds one module per call; nothing is shared between compilations.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompilerOptions,
}

impl Compiler {
    pub fn new(options: CompilerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Parses `source` as the body of an implicit `(begin ...)` and compiles it.
    pub fn compile(&self, source: &str) -> LowerResult<Module> {
        let program = parse_program(source)?;
        self.compile_expr(&program)
    }

    /// Compiles an already-parsed program into a verified module whose entry
    /// function evaluates `program` and returns 0.
    pub fn compile_expr(&self, program: &Expr) -> LowerResult<Module> {
        let options = &self.options;
        let mut module = Module::new(options.module_name.as_str());
        module.declare_function(printf_signature())?;

        let mut root = Environment::new();
        for global in &options.globals {
            let id = module.add_global(&global.name, Constant::Int(global.value))?;
            tracing::debug!(name = %global.name, value = global.value, "declared global");
            root.define(
                global.name.as_str(),
                Binding::Global {
                    global: id,
                    ty: Type::I32,
                },
            );
        }

        let entry = options.entry_function.as_str();
        root.define(entry, Binding::Value(Value::Function(entry.to_string())));

        let mut builder = FunctionBuilder::new(Signature::new(entry, vec![], Type::I32));
        Lowering::new(
            &mut module,
            &mut builder,
            TypeResolver::new(options.strict_types),
        )
        .lower(program, &mut root)?;

        builder.ret(Some(Value::int(0)))?;
        module.define_function(builder.build()?)?;
        verify_module(&module)?;

        tracing::info!(
            module = %module.name,
            strings = module.strings.len(),
            globals = module.globals.len(),
            "compiled module"
        );
        Ok(module)
    }
}
