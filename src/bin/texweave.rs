use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "texweave", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite the maps described by a recipe JSON into a PNG.
    Composite(CompositeArgs),
}

#[derive(Parser, Debug)]
struct CompositeArgs {
    /// Input recipe JSON; map paths resolve relative to its directory.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Run the pixel loop on a rayon thread pool.
    #[arg(long)]
    parallel: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Composite(args) => cmd_composite(args),
    }
}

fn read_recipe_json(path: &Path) -> anyhow::Result<texweave::Recipe> {
    let f = File::open(path).with_context(|| format!("open recipe '{}'", path.display()))?;
    let r = BufReader::new(f);
    let recipe: texweave::Recipe =
        serde_json::from_reader(r).with_context(|| "parse recipe JSON")?;
    Ok(recipe)
}

fn cmd_composite(args: CompositeArgs) -> anyhow::Result<()> {
    let recipe = read_recipe_json(&args.in_path)?;

    let root = args.in_path.parent().unwrap_or_else(|| Path::new("."));
    let maps = recipe.resolve(root)?;

    let compositor = texweave::Compositor::new(recipe.texture_size, recipe.texture_size)?
        .parallel(args.parallel);
    let out = compositor.composite(&maps)?;

    texweave::write_png(&args.out, &out)?;
    println!(
        "wrote {} ({}x{})",
        args.out.display(),
        out.width(),
        out.height()
    );
    Ok(())
}
