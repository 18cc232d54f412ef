use actix_web::{middleware, web, App, HttpServer};
use chrono::{SecondsFormat, Utc};
use log::info;
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{self, Write};

mod config;
mod error;
mod form;
mod handlers;
mod models;
mod services;
mod utils;

use config::{build_cli, Action, Config};
use models::{AppState, Language, PunRequest};
use services::corpus_loader::load_corpus;
use services::datamuse::RhymeApi;
use services::generator::{generate_puns, render_output};

// Log lines carry an RFC 3339 timestamp; optionally appended to a file
fn init_logging(log_file: Option<&str>) -> io::Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    builder.format(|buf, record| {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        writeln!(buf, "[{}] {} {}: {}", timestamp, record.level(), record.target(), record.args())
    });

    if let Some(file) = log_file {
        let log_output = OpenOptions::new().create(true).append(true).open(file)?;
        builder.target(env_logger::Target::Pipe(Box::new(log_output)));
    }

    builder.init();
    Ok(())
}

fn build_state(config: &Config, langs: &[Language]) -> AppState {
    let mut corpora = HashMap::new();
    for &lang in langs {
        info!("Loading corpus for language: {}", lang);
        corpora.insert(lang, load_corpus(&config.share_dir, lang));
    }

    let rhyme_api = config.rhyme_api.as_deref().map(|url| {
        info!("Using rhyme service at {}", url);
        RhymeApi::new(url)
    });

    AppState {
        corpora,
        rhyme_api,
        max_results: config.max_results,
    }
}

async fn serve(config: Config) -> io::Result<()> {
    let state = build_state(&config, &config.langs);
    let shared_state = web::Data::new(state);

    info!("Listening on {}", config.listen_host);
    HttpServer::new(move || {
        App::new()
            .app_data(shared_state.clone())
            .wrap(middleware::Logger::default())
            .configure(handlers::configure)
    })
    .bind(&config.listen_host)?
    .run()
    .await
}

async fn query(config: &Config, request: PunRequest) -> io::Result<()> {
    let language = request.language.unwrap_or_default();
    let state = build_state(config, &[language]);

    println!("INPUT: {}", request.input);
    let puns = generate_puns(&state, &request)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
    println!("{}", render_output(&puns));
    Ok(())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    let matches = build_cli().get_matches();
    let config = Config::from_matches(&matches)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

    init_logging(config.log_file.as_deref())?;

    match config.action.clone() {
        Action::Serve => serve(config).await,
        Action::Query {
            words,
            mode,
            language,
            categories,
            include_nsfw,
        } => {
            let request = PunRequest {
                input: words.join(" "),
                categories,
                language,
                include_nsfw,
                mode,
            };
            query(&config, request).await
        }
        Action::MissingPhonetics { language } => {
            let corpus = load_corpus(&config.share_dir, language);
            for word in corpus.missing_phonetics() {
                println!("{}\t{}", word.canonical(), word.source.display_name());
            }
            Ok(())
        }
    }
}
