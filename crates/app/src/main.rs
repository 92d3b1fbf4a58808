use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use resume_rank_core::{
    build_index, extract_document_text, load_corpus_best_effort, AnswerEndpointConfig,
    AnswerProvider, DocumentQa, ExtractiveAnswerProvider, HashedFeatureEmbedder,
    HttpAnswerProvider, LocalVectorIndex, RankerConfig, RankingOutcome, RelevanceScorer,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "resume-rank", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON configuration file
    #[arg(long, env = "RESUME_RANK_CONFIG", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Rank every document in a folder against a job description.
    Rank {
        /// Folder that contains PDF, DOCX or text resumes recursively.
        #[arg(long)]
        folder: PathBuf,
        /// Job description text.
        #[arg(long, conflicts_with = "query_file", required_unless_present = "query_file")]
        query: Option<String>,
        /// File holding the job description (PDF, DOCX or text).
        #[arg(long)]
        query_file: Option<PathBuf>,
        /// Skill labels, as a JSON array or one per line.
        #[arg(long)]
        skills_file: Option<PathBuf>,
        /// Fraction of the best score required for a full match.
        #[arg(long)]
        threshold_ratio: Option<f64>,
        /// Skip the vectorizer's own stop-word list.
        #[arg(long, default_value_t = false)]
        no_vectorizer_stop_words: bool,
        /// Print the ranking as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Build the local vector index used by `ask`.
    Index {
        /// Folder that contains the documents to index.
        #[arg(long)]
        folder: PathBuf,
        /// Directory for the index cache.
        #[arg(long)]
        index_dir: Option<PathBuf>,
    },
    /// Answer a question from the indexed documents.
    Ask {
        /// Question to answer.
        #[arg(long)]
        question: String,
        /// Directory for the index cache.
        #[arg(long)]
        index_dir: Option<PathBuf>,
        /// Number of passages to retrieve.
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Print the text extracted from a single document.
    Extract {
        #[arg(long)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = RankerConfig::load_or_default(cli.config.as_deref())?;

    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "resume-rank boot"
    );

    match cli.command {
        Command::Rank {
            folder,
            query,
            query_file,
            skills_file,
            threshold_ratio,
            no_vectorizer_stop_words,
            json,
        } => {
            if let Some(path) = skills_file {
                config.load_skills_file(&path)?;
            }
            if let Some(ratio) = threshold_ratio {
                config.threshold_ratio = ratio;
            }
            if no_vectorizer_stop_words {
                config.double_stop_word_filter = false;
            }
            config.validate()?;

            let query = match (query, query_file) {
                (Some(query), _) => query,
                (None, Some(path)) => extract_document_text(&path)
                    .with_context(|| format!("reading job description {}", path.display()))?,
                (None, None) => anyhow::bail!("either --query or --query-file is required"),
            };

            let report = load_corpus_best_effort(&folder)
                .with_context(|| format!("loading documents from {}", folder.display()))?;
            report_skipped(&report.skipped_files);

            let scorer = RelevanceScorer::from_config(&config);
            let outcome = scorer.rank(&query, &report.corpus);
            info!(documents = report.corpus.len(), "ranking complete");

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_ranking(&outcome);
            }
        }
        Command::Index { folder, index_dir } => {
            let index_dir = index_dir.unwrap_or_else(|| config.qa.index_dir.clone());
            let report = load_corpus_best_effort(&folder)
                .with_context(|| format!("loading documents from {}", folder.display()))?;
            report_skipped(&report.skipped_files);

            let embedder = HashedFeatureEmbedder::new(config.qa.embedding_dimensions);
            let index = build_index(&report, &config.qa, &embedder)?;
            let path = index.save(&index_dir)?;

            println!(
                "{} chunks from {} documents indexed into {} at {}",
                index.len(),
                report.documents.len(),
                path.display(),
                index.built_at().to_rfc3339()
            );
        }
        Command::Ask {
            question,
            index_dir,
            top_k,
        } => {
            let index_dir = index_dir.unwrap_or_else(|| config.qa.index_dir.clone());
            let top_k = top_k.unwrap_or(config.qa.top_k).max(1);
            let index = LocalVectorIndex::load(&index_dir)?;
            let embedder = HashedFeatureEmbedder::new(index.dimensions());

            match AnswerEndpointConfig::from_env()? {
                Some(endpoint) => {
                    let provider = HttpAnswerProvider::new(endpoint);
                    answer_question(DocumentQa::new(index, embedder, provider, top_k), &question)
                        .await?
                }
                None => {
                    answer_question(
                        DocumentQa::new(index, embedder, ExtractiveAnswerProvider, top_k),
                        &question,
                    )
                    .await?
                }
            }
        }
        Command::Extract { file } => {
            let text = extract_document_text(Path::new(&file))
                .with_context(|| format!("extracting {}", file.display()))?;
            println!("{text}");
        }
    }

    Ok(())
}

async fn answer_question<P>(
    qa: DocumentQa<HashedFeatureEmbedder, P>,
    question: &str,
) -> anyhow::Result<()>
where
    P: AnswerProvider + Send + Sync,
{
    let answer = qa.ask(question).await?;
    println!("Reply: {}", answer.text);
    for citation in answer.citations {
        println!(
            "  source={} chunk={} score={:.4}",
            citation.document_id, citation.chunk_id, citation.score
        );
    }
    Ok(())
}

fn report_skipped(skipped: &[resume_rank_core::SkippedDocument]) {
    if skipped.is_empty() {
        return;
    }
    warn!(skipped_files = skipped.len(), "some documents could not be read");
    for file in skipped {
        warn!(path = %file.path.display(), reason = %file.reason, "skipped document");
    }
}

fn print_ranking(outcome: &RankingOutcome) {
    match outcome {
        RankingOutcome::NoRelevantFiles => println!("no relevant files"),
        RankingOutcome::Ranked(documents) if documents.is_empty() => {
            println!("no documents to rank")
        }
        RankingOutcome::Ranked(documents) => {
            println!("{:<5} {:<8} {:<14} file", "rank", "score", "tier");
            for (position, document) in documents.iter().enumerate() {
                println!(
                    "{:<5} {:<8.4} {:<14} {}",
                    position + 1,
                    document.score,
                    document.tier,
                    document.document_id
                );
            }
        }
    }
}
