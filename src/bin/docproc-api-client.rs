use clap::{value_parser, Arg, ArgGroup, Command};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use docproc_api_client::{
    create_extract_job_and_fetch_status, DocProcAPIClient, DEFAULT_SERVER_ADDR,
    EXTRACT_DATA_JOB_TYPE,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("docproc-api-client")
        .arg(
            Arg::new("server-addr")
                .long("server-addr")
                .required(false)
                .default_value(DEFAULT_SERVER_ADDR)
                .value_parser(value_parser!(url::Url)),
        )
        .arg_required_else_help(true)
        .subcommand_required(true)
        .subcommand(
            Command::new("upload")
                .arg(
                    Arg::new("file_path")
                        .value_parser(value_parser!(PathBuf))
                        .required(true),
                )
                .arg(Arg::new("uploaded-by").long("uploaded-by").required(false)),
        )
        .subcommand(
            Command::new("create-job")
                .arg(Arg::new("document_id").required(true))
                .arg(
                    Arg::new("job-type")
                        .long("job-type")
                        .default_value(EXTRACT_DATA_JOB_TYPE),
                ),
        )
        .subcommand(Command::new("job-status").arg(Arg::new("job_id").required(true)))
        .subcommand(
            Command::new("job-results")
                .arg(Arg::new("job_id").required(true))
                .arg(Arg::new("result_type").required(false)),
        )
        .subcommand(Command::new("document-jobs").arg(Arg::new("document_id").required(true)))
        .subcommand(Command::new("download-document").arg(Arg::new("document_id").required(true)))
        .subcommand(Command::new("delete-document").arg(Arg::new("document_id").required(true)))
        .subcommand(Command::new("cancel-job").arg(Arg::new("job_id").required(true)))
        .subcommand(Command::new("retry-job").arg(Arg::new("job_id").required(true)))
        .subcommand(
            Command::new("smoke-test")
                .arg(
                    Arg::new("file")
                        .long("file")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(Arg::new("document-id").long("document-id"))
                .group(
                    ArgGroup::new("document")
                        .args(["file", "document-id"])
                        .required(true),
                ),
        )
        .get_matches();

    let server_addr = matches
        .get_one::<url::Url>("server-addr")
        .expect("server-addr has a default value");

    let client = DocProcAPIClient::new_for_server(server_addr.as_str())?;

    let output: serde_json::Value;

    if let Some(matches) = matches.subcommand_matches("upload") {
        let file_path = matches
            .get_one::<PathBuf>("file_path")
            .expect("file_path is required");
        let uploaded_by = matches.get_one::<String>("uploaded-by");
        let outcome = client.upload_document(
            fs::File::open(file_path)?,
            &upload_name(file_path),
            uploaded_by.map(|s| s.as_str()),
        )?;
        output = serde_json::to_value(&outcome)?;
    } else if let Some(matches) = matches.subcommand_matches("create-job") {
        let document_id = matches
            .get_one::<String>("document_id")
            .expect("document_id is required");
        let job_type = matches
            .get_one::<String>("job-type")
            .expect("job-type has a default value");
        let job = client.create_job(document_id, job_type, None)?;
        output = serde_json::to_value(&job)?;
    } else if let Some(matches) = matches.subcommand_matches("job-status") {
        let job_id = matches
            .get_one::<String>("job_id")
            .expect("job_id is required");
        output = serde_json::to_value(&client.get_job(job_id)?)?;
    } else if let Some(matches) = matches.subcommand_matches("job-results") {
        let job_id = matches
            .get_one::<String>("job_id")
            .expect("job_id is required");
        match matches.get_one::<String>("result_type") {
            Some(result_type) => {
                output = serde_json::to_value(&client.get_job_result(job_id, result_type)?)?;
            }
            None => {
                output = serde_json::to_value(&client.get_job_results(job_id)?)?;
            }
        }
    } else if let Some(matches) = matches.subcommand_matches("document-jobs") {
        let document_id = matches
            .get_one::<String>("document_id")
            .expect("document_id is required");
        output = serde_json::to_value(&client.get_document_jobs(document_id)?)?;
    } else if let Some(matches) = matches.subcommand_matches("download-document") {
        let document_id = matches
            .get_one::<String>("document_id")
            .expect("document_id is required");
        output = serde_json::to_value(&client.download_document(document_id)?)?;
    } else if let Some(matches) = matches.subcommand_matches("delete-document") {
        let document_id = matches
            .get_one::<String>("document_id")
            .expect("document_id is required");
        output = serde_json::to_value(&client.delete_document(document_id)?)?;
    } else if let Some(matches) = matches.subcommand_matches("cancel-job") {
        let job_id = matches
            .get_one::<String>("job_id")
            .expect("job_id is required");
        output = serde_json::to_value(&client.cancel_job(job_id)?)?;
    } else if let Some(matches) = matches.subcommand_matches("retry-job") {
        let job_id = matches
            .get_one::<String>("job_id")
            .expect("job_id is required");
        output = serde_json::to_value(&client.retry_job(job_id)?)?;
    } else if let Some(matches) = matches.subcommand_matches("smoke-test") {
        output = run_smoke_test(&client, matches)?;
    } else {
        unreachable!("subcommand_required is set");
    }

    serde_json::to_writer_pretty(io::stdout(), &output)?;
    println!();
    Ok(())
}

/// The manual end-to-end check: resolve a document id, queue an extract_data
/// job, then fetch its status exactly once. No waiting for completion; a
/// fresh job will usually still report queued or processing.
fn run_smoke_test(
    client: &DocProcAPIClient,
    matches: &clap::ArgMatches,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let document_id = match matches.get_one::<PathBuf>("file") {
        Some(file_path) => {
            let outcome = client.upload_document(
                fs::File::open(file_path)?,
                &upload_name(file_path),
                Some("smoke-test"),
            )?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            outcome.document.id
        }
        None => matches
            .get_one::<String>("document-id")
            .expect("document-id is required when no file is given")
            .clone(),
    };

    let (job, details) = create_extract_job_and_fetch_status(client, &document_id)?;
    println!("{}", serde_json::to_string_pretty(&job)?);
    Ok(serde_json::to_value(&details)?)
}

fn upload_name(file_path: &Path) -> String {
    match file_path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => String::from("document"),
    }
}
