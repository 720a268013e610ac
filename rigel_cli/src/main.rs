// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use clap::Parser as ClapParser;
use oxc_diagnostics::OxcDiagnostic;
use oxc_parser::Parser;
use oxc_semantic::{SemanticBuilder, SemanticBuilderReturn};
use oxc_span::SourceType;
use rigel_vm::ecmascript::builtins::error::uncaught_exception_message;
use rigel_vm::{Agent, AgentOptions, CompletionType, Interpreter};

/// A tree-walking ECMAScript 5.1 interpreter
#[derive(Debug, ClapParser)]
#[command(name = "rigel")]
#[command(about = "A tree-walking ECMAScript interpreter", long_about = None)]
struct Cli {
    /// The path of the script to evaluate.
    path: String,

    /// Parse the file and log out the AST instead of evaluating.
    #[arg(long)]
    dump_ast: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    let source = std::fs::read_to_string(&args.path)?;
    let allocator = Default::default();
    let source_type = SourceType::default().with_script(true);
    let parser = Parser::new(&allocator, &source, source_type);
    let result = parser.parse();

    if !result.errors.is_empty() {
        exit_with_parse_errors(result.errors, &args.path, &source);
    }

    let SemanticBuilderReturn { errors, .. } = SemanticBuilder::new()
        .with_check_syntax_error(true)
        .build(&result.program);
    if !errors.is_empty() {
        exit_with_parse_errors(errors, &args.path, &source);
    }

    if args.dump_ast {
        println!("{:#?}", result.program);
        return Ok(());
    }

    let mut agent = Agent::new(AgentOptions::default());
    let completion = Interpreter::new(&mut agent).execute(&result.program);

    // An uncaught exception prints as "name: message" and still exits
    // cleanly; only I/O and syntax failures are process errors.
    if completion.kind == CompletionType::Throw {
        let value = completion
            .value
            .expect("throw completion carries a value");
        eprintln!("{}", uncaught_exception_message(&mut agent, value));
    }
    Ok(())
}

/// Exit the program with parse errors.
fn exit_with_parse_errors(errors: Vec<OxcDiagnostic>, source_path: &str, source: &str) -> ! {
    assert!(!errors.is_empty());

    // This seems to be needed for color and Unicode output.
    miette::set_hook(Box::new(|_| {
        Box::new(oxc_diagnostics::GraphicalReportHandler::new())
    }))
    .unwrap();

    // SAFETY: This function never returns, so `source`'s lifetime must last
    // for the duration of the program.
    let source: &'static str = unsafe { std::mem::transmute(source) };
    let named_source = miette::NamedSource::new(source_path, source);

    eprintln!("SyntaxError:");

    for error in errors {
        let report = error.with_source_code(named_source.clone());
        eprintln!("{report:?}");
    }

    std::process::exit(1);
}
