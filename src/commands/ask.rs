use eyre::Result;

use crate::config::Config;

pub fn run(message: &[String], dry_run: bool, verbose: bool, config: &Config) -> Result<()> {
    let (session, _greeting) = super::open_session(config, dry_run)?;
    let utterance = message.join(" ");

    if verbose {
        let turn = session.turn(&utterance);
        super::print_tool_calls(&turn.tool_calls);
        println!("{}", turn.reply);
    } else {
        println!("{}", session.handle(&utterance));
    }

    Ok(())
}
