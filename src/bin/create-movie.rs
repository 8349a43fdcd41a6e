use std::error::Error;

use dotenv::dotenv;
use log::{error, info, initialize_logger};
use structopt::StructOpt;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use movies::config::DbConfig;
use movies::{create, Actor, Client, Context, Movie, PgTransaction};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "create-movie",
    about = "Validate a movie and store it in the database"
)]
struct Opt {
    #[structopt(long)]
    title: String,

    #[structopt(long)]
    year: i32,

    /// The content rating, e.g. "R"
    #[structopt(long)]
    rated: String,

    /// The release date as YYYY-MM-DD
    #[structopt(long, parse(try_from_str = parse_date))]
    released: OffsetDateTime,

    /// The running time in minutes
    #[structopt(long)]
    run_time: i32,

    #[structopt(long)]
    director: String,

    #[structopt(long)]
    writer: String,

    /// The user the movie is created by
    #[structopt(long)]
    username: String,

    /// The server token identifying the client
    #[structopt(long, conflicts_with = "client-number", required_unless = "client-number")]
    server_token: Option<String>,

    /// An already known client number, instead of a server token
    #[structopt(long, requires = "client-id")]
    client_number: Option<i32>,

    #[structopt(long, parse(try_from_str = Uuid::parse_str))]
    client_id: Option<Uuid>,
}

fn parse_date(s: &str) -> Result<OffsetDateTime, time::ParseError> {
    Ok(Date::parse(s, "%F")?.midnight().assume_utc())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    let opt = Opt::from_args();

    let logger = initialize_logger();

    let config = DbConfig::from_env()?;
    let pool = config
        .connect()
        .await
        .expect("create database pool from MOVIES_DB_CONNECTION_STRING");

    let actor = match (opt.server_token, opt.client_id, opt.client_number) {
        (Some(token), _, _) => Actor::with_server_token(opt.username, token),
        (None, Some(id), Some(number)) => Actor::with_client(opt.username, Client::new(id, number)),
        _ => return Err("either --server-token or --client-id with --client-number is required".into()),
    };

    let movie = Movie {
        title: opt.title,
        year: opt.year,
        rated: opt.rated,
        released: Some(opt.released),
        run_time: opt.run_time,
        director: opt.director,
        writer: opt.writer,
        ..Default::default()
    };

    let mut ctx = Context::new(logger.clone());

    if let Some(timeout) = config.create_timeout {
        ctx = ctx.with_timeout(timeout);
    }

    let mut tx = PgTransaction::begin(&pool).await?;

    match create(&ctx, movie, &mut tx, &actor).await {
        Ok(movie) => {
            tx.commit().await?;

            info!(logger, "Committed movie"; "title" => &movie.title);
            println!("{}", serde_json::to_string_pretty(&movie)?);

            Ok(())
        }
        Err(e) => {
            error!(logger, "Unable to create movie"; "kind" => %e.kind(), "param" => e.param(), "error" => %e);

            if tx.is_open() {
                use movies::MovieTransaction;

                tx.rollback().await?;
            }

            Err(e.into())
        }
    }
}
