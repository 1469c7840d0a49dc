use derivate::{dx, evaluate, expand, simplify, Builtins, Expression};
use std::io::{BufRead, BufReader, Write};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let ctx = Builtins::default();

    prompt(&mut stdout.lock())?;

    for line in BufReader::new(stdin.lock()).lines() {
        let line = line?;

        if !line.trim().is_empty() {
            match line.parse::<Expression>() {
                Ok(expr) => show(&expr, &ctx),
                Err(e) => eprintln!("Unable to parse \"{}\": {}", line, e),
            }
        }

        prompt(&mut stdout.lock())?;
    }

    Ok(())
}

fn show(expr: &Expression, ctx: &Builtins) {
    let simplified = simplify(expr);
    println!("  simplified: {}", simplified);
    println!("  d/dx:       {}", dx(&simplified));
    println!("  expanded:   {}", expand(&simplified));

    if let Ok(value) = evaluate(&simplified, |_| None, ctx) {
        println!("  value:      {}", value);
    }
}

fn prompt<W: Write>(stdout: &mut W) -> std::io::Result<()> {
    write!(stdout, "> ")?;
    stdout.flush()
}
