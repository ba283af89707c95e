use std::io;

use kaleido::backend::interp::Interpreter;
use kaleido::frontend::lexer::Chars;
use kaleido::repl::Session;

/// Read statements from stdin until end of input. All prompts, results,
/// and diagnostics go to stderr, leaving stdout free for piping. Errors
/// are recovered statement by statement, so the only exit is a clean one.
fn main() -> io::Result<()> {
    let stdin = io::stdin();
    let input = Chars::new(stdin.lock());
    let mut session = Session::new(Interpreter::new(), io::stderr());
    session.run(input)
}
