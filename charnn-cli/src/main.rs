use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use log::info;

use charnn_core::corpus::Corpus;
use charnn_core::io::cache_path;
use charnn_core::model::MultiGramModel;
use charnn_core::model::multigram_model::DEFAULT_SMOOTHING;
use charnn_core::sampler::{GenerationParams, Sampler};
use charnn_core::training::{TrainingConfig, fit};

/// Train character models and generate text from them.
#[derive(Parser)]
#[command(name = "charnn", version)]
struct Cli {
	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Fit a model on a text file and save it
	Train(TrainArgs),
	/// Extend a prompt with a saved model
	Generate(GenerateArgs),
	/// Extend three Hamlet/Henry IV quotes at temperatures 0.01, 1 and 100
	Demo(DemoArgs),
}

#[derive(Args)]
struct TrainArgs {
	/// Training text
	corpus: PathBuf,

	/// Where to save the model (defaults to the corpus path with a `.bin` extension)
	#[arg(short, long)]
	output: Option<PathBuf>,

	/// Candidate orders, the most accurate on validation is kept
	#[arg(long, value_delimiter = ',', default_values_t = [3, 5, 7])]
	orders: Vec<usize>,

	#[arg(long, default_value_t = DEFAULT_SMOOTHING)]
	smoothing: f64,

	#[arg(long, default_value_t = 1_000_000)]
	train_size: usize,

	#[arg(long, default_value_t = 60_000)]
	valid_size: usize,

	/// Input length of validation windows
	#[arg(long, default_value_t = 100)]
	window_length: usize,
}

#[derive(Args)]
struct GenerateArgs {
	/// Saved model
	#[arg(short, long)]
	model: PathBuf,

	/// Text to extend
	#[arg(short, long)]
	prompt: String,

	/// Number of characters to append
	#[arg(short, long, default_value_t = 50, allow_negative_numbers = true)]
	n_chars: i64,

	#[arg(short, long, default_value_t = 1.0)]
	temperature: f64,

	/// Seed for reproducible output
	#[arg(short, long)]
	seed: Option<u64>,
}

#[derive(Args)]
struct DemoArgs {
	/// Saved model
	#[arg(short, long)]
	model: PathBuf,

	#[arg(short, long, default_value_t = 50)]
	n_chars: i64,

	#[arg(short, long, default_value_t = 42)]
	seed: u64,
}

const DEMO: [(&str, f64); 3] = [
	("To be, or not to be", 0.01),
	("The lady doth protest too much", 1.0),
	("Uneasy is the head that wears a crown", 100.0),
];

fn train(args: TrainArgs) -> Result<(), Box<dyn std::error::Error>> {
	let config = TrainingConfig {
		orders: args.orders,
		smoothing: args.smoothing,
		train_size: args.train_size,
		valid_size: args.valid_size,
		window_length: args.window_length,
	};

	let corpus = Corpus::load(&args.corpus)?;
	let (model, report) = fit(&corpus, &config)?;
	for (order, score) in &report.candidates {
		match score {
			Some(score) => println!("order {order}: validation accuracy {score:.4}"),
			None => println!("order {order}: no validation window"),
		}
	}

	let output = match args.output {
		Some(output) => output,
		None => cache_path(&args.corpus)?,
	};
	model.save(&output)?;
	println!("kept order {} -> {}", report.order, output.display());
	Ok(())
}

fn generate(args: GenerateArgs) -> Result<(), Box<dyn std::error::Error>> {
	let mut params = GenerationParams::new(args.prompt)?;
	params.set_n_chars(args.n_chars)?;
	params.set_temperature(args.temperature)?;
	params.seed = args.seed;

	let model = MultiGramModel::load(&args.model)?;
	let mut sampler = Sampler::seeded(&model, model.vocabulary(), params.seed);
	println!("{}", sampler.generate(&params)?);
	Ok(())
}

fn demo(args: DemoArgs) -> Result<(), Box<dyn std::error::Error>> {
	let model = MultiGramModel::load(&args.model)?;
	let mut sampler = Sampler::seeded(&model, model.vocabulary(), Some(args.seed));

	for (prompt, temperature) in DEMO {
		let mut params = GenerationParams::new(prompt)?;
		params.set_n_chars(args.n_chars)?;
		params.set_temperature(temperature)?;
		info!("temperature {temperature}");
		println!("{}\n", sampler.generate(&params)?);
	}
	Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	match Cli::parse().command {
		Command::Train(args) => train(args),
		Command::Generate(args) => generate(args),
		Command::Demo(args) => demo(args),
	}
}
