use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, put, web};
use clap::Parser;
use log::{error, info, warn};
use serde::Deserialize;

use charnn_core::Error;
use charnn_core::io::{MODEL_EXTENSION, list_models};
use charnn_core::model::MultiGramModel;
use charnn_core::sampler::{GenerationParams, Sampler};

/// HTTP front end serving text generation from saved models.
#[derive(Parser, Debug)]
#[command(name = "charnn-server", version)]
struct ServerConfig {
	#[arg(long, default_value = "127.0.0.1")]
	host: String,

	#[arg(long, default_value_t = 5000)]
	port: u16,

	/// Directory holding `.bin` models
	#[arg(long, default_value = "./data")]
	data_dir: PathBuf,

	/// Model (file stem inside the data directory) loaded at startup
	#[arg(long)]
	model: Option<String>,
}

/// Query parameters of the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	prompt: String,
	n_chars: Option<i64>,
	temperature: Option<f64>,
	seed: Option<u64>,
}

#[derive(Deserialize)]
struct ModelQuery {
	name: Option<String>,
}

struct LoadedModel {
	name: String,
	model: MultiGramModel,
}

struct SharedData {
	data_dir: PathBuf,
	loaded: Option<LoadedModel>,
}

impl GenerateParams {
	/// Validates the query into generation parameters.
	fn to_generation_params(&self) -> Result<GenerationParams, Error> {
		let mut params = GenerationParams::new(self.prompt.as_str())?;
		if let Some(n_chars) = self.n_chars {
			params.set_n_chars(n_chars)?;
		}
		if let Some(temperature) = self.temperature {
			params.set_temperature(temperature)?;
		}
		params.seed = self.seed;
		Ok(params)
	}
}

/// Maps a library error to an HTTP response.
fn error_response(e: Error) -> HttpResponse {
	match e {
		Error::InvalidParameter { .. } => HttpResponse::BadRequest().body(e.to_string()),
		Error::ModelUnavailable(_) => HttpResponse::ServiceUnavailable().body(e.to_string()),
		_ => {
			error!("Generation failed: {e}");
			HttpResponse::InternalServerError().body(e.to_string())
		}
	}
}

/// Locks the shared state.
///
/// `SharedData` is only ever changed by whole-field assignments, so the
/// state behind a poisoned lock is still consistent.
fn lock_state(data: &Mutex<SharedData>) -> MutexGuard<'_, SharedData> {
	data.lock().unwrap_or_else(PoisonError::into_inner)
}

/// HTTP GET endpoint `/v1/generate`
///
/// Extends `prompt` with the loaded model and returns the whole text.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<Mutex<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let params = match query.to_generation_params() {
		Ok(p) => p,
		Err(e) => return error_response(e),
	};

	let shared_data = lock_state(&data);
	let loaded = match &shared_data.loaded {
		Some(loaded) => loaded,
		None => return HttpResponse::ServiceUnavailable().body("No model loaded"),
	};

	let mut sampler = Sampler::seeded(&loaded.model, loaded.model.vocabulary(), params.seed);
	match sampler.generate(&params) {
		Ok(text) => HttpResponse::Ok().body(text),
		Err(e) => error_response(e),
	}
}

/// Models available in the data directory
#[get("/v1/models")]
async fn get_models(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let data_dir = lock_state(&data).data_dir.clone();
	match list_models(&data_dir) {
		Ok(names) => HttpResponse::Ok().body(names.join("\n")),
		Err(e) => {
			warn!("Cannot list {}: {e}", data_dir.display());
			HttpResponse::InternalServerError().body("Failed to list models")
		}
	}
}

#[get("/v1/loaded_model")]
async fn get_loaded_model(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = lock_state(&data);
	match &shared_data.loaded {
		Some(loaded) => HttpResponse::Ok().body(loaded.name.clone()),
		None => HttpResponse::NotFound().body("No model loaded"),
	}
}

/// Generation symbols of the loaded model, in id order
#[get("/v1/vocabulary")]
async fn get_vocabulary(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = lock_state(&data);
	match &shared_data.loaded {
		Some(loaded) => HttpResponse::Ok().body(loaded.model.vocabulary().symbols().iter().collect::<String>()),
		None => HttpResponse::ServiceUnavailable().body("No model loaded"),
	}
}

#[put("/v1/load_model")]
async fn put_model(data: web::Data<Mutex<SharedData>>, query: web::Query<ModelQuery>) -> impl Responder {
	let name = match &query.name {
		Some(s) if !s.trim().is_empty() => s.trim().to_owned(),
		_ => return HttpResponse::BadRequest().body("Missing or empty model name"),
	};
	if name.contains(['/', '\\']) || name.starts_with('.') {
		return HttpResponse::BadRequest().body("Model name must be a plain file stem");
	}

	let mut shared_data = lock_state(&data);
	match load_model(&shared_data.data_dir, &name) {
		Ok(loaded) => {
			shared_data.loaded = Some(loaded);
			HttpResponse::Ok().body("Model loaded successfully")
		}
		Err(e) => HttpResponse::InternalServerError().body(format!("Failed to load model: {e}")),
	}
}

fn load_model(data_dir: &Path, name: &str) -> Result<LoadedModel, Error> {
	let path = data_dir.join(format!("{name}.{MODEL_EXTENSION}"));
	let model = MultiGramModel::load(&path)?;
	Ok(LoadedModel { name: name.to_owned(), model })
}

/// Registers every endpoint on an actix service config.
fn routes(cfg: &mut web::ServiceConfig) {
	cfg.service(get_generated)
		.service(get_models)
		.service(get_loaded_model)
		.service(get_vocabulary)
		.service(put_model);
}

/// Main entry point for the server.
///
/// Optionally loads a model, wraps the shared state in a `Mutex`
/// and starts an Actix-web HTTP server.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
	let config = ServerConfig::parse();

	let loaded = match &config.model {
		Some(name) => match load_model(&config.data_dir, name) {
			Ok(loaded) => Some(loaded),
			Err(e) => {
				warn!("Starting without a model, {name} failed to load: {e}");
				None
			}
		},
		None => None,
	};
	let shared_data = web::Data::new(Mutex::new(SharedData { data_dir: config.data_dir.clone(), loaded }));

	info!("Listening on {}:{}", config.host, config.port);
	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_data.clone())
			.configure(routes)
	})
		.bind((config.host.as_str(), config.port))?
		.run()
		.await
}
