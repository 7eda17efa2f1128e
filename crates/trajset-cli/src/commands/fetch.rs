use crate::cli::FetchArgs;
use crate::error::Result;
use crate::fetch::{ArchiveFetcher, FetchProgress};
use indicatif::{ProgressBar, ProgressStyle};

pub async fn run(args: FetchArgs) -> Result<()> {
    let fetcher = ArchiveFetcher::new(&args.dest);

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
        )
            .unwrap()
            .progress_chars("#>-"),
    );
    pb.set_draw_target(indicatif::ProgressDrawTarget::stderr_with_hz(2));

    println!("Downloading bundle to: {:?}", fetcher.dest());

    let progress_callback = |progress: FetchProgress| match progress {
        FetchProgress::Started { total_size } => {
            if let Some(size) = total_size {
                pb.set_length(size);
            }
            pb.set_message("Downloading...");
        }
        FetchProgress::Downloading { downloaded } => {
            pb.set_position(downloaded);
        }
        FetchProgress::Unpacking => {
            pb.set_style(ProgressStyle::with_template("{spinner:.green} {msg}").unwrap());
            pb.set_message("Unpacking bundle...");
        }
    };

    match fetcher.fetch(&args.url, args.force, progress_callback).await {
        Ok(_) => {
            pb.finish_with_message("✓ Bundle download and unpack complete.");
            Ok(())
        }
        Err(e) => {
            pb.finish_with_message("✗ Download failed.");
            Err(e)
        }
    }
}
