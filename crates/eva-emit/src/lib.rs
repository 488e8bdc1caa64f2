/*! Render Eva IR modules as text.
 *
 * The format follows Cranelift's textual IR: `function %name(...) -> ty { ... }` with `blockN:`
 * labels in layout order, one instruction per line, and phis written as
 * `phi.ty [value, block], ...`. Output is stable for a given module, so it doubles as a snapshot
 * format in tests.
 */

pub mod config;
pub mod emitter;

pub use config::{EmitterConfig, IndentStyle};
pub use emitter::IrEmitter;

#[cfg(test)]
mod tests {
    use super::*;
    use eva_lower::compile_program;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_emit_module_with_default_config() {
        let module = compile_program(r#"(var x 10) (set x (- x 1)) (printf "%d\n" x)"#).unwrap();
        let text = IrEmitter::default().emit_module(&module);

        let expected = r#"; module eva

@VERSION = global i32 42, align 4

str0 = string [4 x i8] "%d\n"

declare %printf(i8*, ...) -> i32

function %main() -> i32 {
block0:  ; entry
    ss0 = alloca.i32  ; x
    store 10, ss0
    v0 = load.i32 ss0
    v1 = isub v0, 1
    store v1, ss0
    v2 = load.i32 ss0
    v3 = call %printf(str0, v2)
    return 0
}
"#;
        assert_eq!(text, expected);
    }

    #[test]
    fn test_emit_conditional_plain() {
        let module = compile_program("(if (> 1 2) 10 20)").unwrap();
        let main = module.get_function("main").unwrap();
        let text = IrEmitter::new(EmitterConfig::plain()).emit_function(main, &module);

        let expected = "function %main() -> i32 {
block0:
    v0 = icmp ugt 1, 2
    brif v0, block1, block2

block1:
    jump block3

block2:
    jump block3

block3:
    v1 = phi.i32 [10, block1], [20, block2]
    return 0
}
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_globals_print_by_name() {
        let module = compile_program("(set VERSION 7)").unwrap();
        let text = IrEmitter::new(EmitterConfig::plain()).emit_module(&module);
        assert!(text.contains("store 7, @VERSION"));
    }

    #[test]
    fn test_tab_indentation() {
        let module = compile_program("1").unwrap();
        let config = EmitterConfig {
            indent_style: IndentStyle::Tabs,
            ..EmitterConfig::plain()
        };
        let text = IrEmitter::new(config).emit_module(&module);
        assert!(text.contains("block0:\n\treturn 0\n"));
    }

    #[test]
    fn test_colored_output() {
        colored::control::set_override(true);
        let module = compile_program("1").unwrap();
        let text = IrEmitter::new(EmitterConfig::terminal()).emit_module(&module);
        colored::control::unset_override();
        assert!(text.contains("\u{1b}["));
    }

    #[test]
    fn test_write_module_matches_emit() {
        let module = compile_program(r#"(printf "hi")"#).unwrap();
        let emitter = IrEmitter::default();
        let mut buffer = Vec::new();
        emitter.write_module(&module, &mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), emitter.emit_module(&module));
    }

    #[test]
    fn test_config_from_json() {
        let config: EmitterConfig =
            serde_json::from_str(r#"{ "use_colors": true, "indent_style": { "Spaces": 2 } }"#).unwrap();
        assert!(config.use_colors);
        assert_eq!(config.indent_style, IndentStyle::Spaces(2));
        assert!(config.block_comments);
    }
}
