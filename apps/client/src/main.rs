use anyhow::{bail, Context, Result};
use clap::Parser;
use std::sync::Arc;
use wordbook_client::{
    init_tracing, BookSession, ClientConfig, FileSessionStore, HttpWordRepository, SessionStore,
};
use wordbook_core::{SortMode, Word};

/// Words shown per list in the overview.
const PREVIEW_LEN: usize = 5;

#[derive(Parser, Debug)]
#[command(version, about = "Browse the study lists of a word book", long_about = None)]
struct Args {
    /// Book id, e.g. cet4-core. Without it the categories are listed.
    book: Option<String>,

    /// Sort words alphabetically instead of book order
    #[arg(short, long)]
    alphabetical: bool,

    /// Print every word of one study list (1-based)
    #[arg(short, long)]
    list: Option<usize>,

    /// Print only the starred words
    #[arg(long)]
    starred: bool,

    #[arg(short, long, env = "WORDBOOK_USERNAME")]
    username: Option<String>,

    #[arg(short, long, env = "WORDBOOK_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Log out and forget the stored session
    #[arg(long)]
    logout: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let args = Args::parse();

    let config = ClientConfig::from_env()?;
    let session: Arc<dyn SessionStore> = Arc::new(FileSessionStore::open(&config.session_file));
    let repository = HttpWordRepository::from_config(&config, session.clone())?;

    if args.logout {
        repository.logout().await?;
        println!("Logged out");
        return Ok(());
    }

    if session.get_token().is_none() {
        match (&args.username, &args.password) {
            (Some(username), Some(password)) => {
                let user = repository
                    .login(username, password)
                    .await
                    .context("login failed")?;
                tracing::info!(username = %user.username, "logged in");
            }
            _ if args.book.is_some() => {
                bail!("not logged in, pass --username and --password");
            }
            _ => {}
        }
    }

    let Some(book_id) = args.book else {
        for category in repository.fetch_categories().await {
            println!("{:>3}  {}", category.id, category.name);
        }
        return Ok(());
    };

    let sort_mode = if args.alphabetical {
        SortMode::Alphabetical
    } else {
        SortMode::Original
    };
    let book = BookSession::load(Arc::new(repository), book_id, sort_mode).await?;

    let progress = book.progress();
    println!(
        "{}: {} words, {} learned, {} starred",
        book.book_id(),
        progress.total,
        progress.learned,
        progress.starred
    );

    if args.starred {
        print_words(&book.starred());
    } else if let Some(number) = args.list {
        print_words(&book.list(number)?.words);
    } else {
        for list in book.lists() {
            println!(
                "List {:>3} ({} words): {}",
                list.number,
                list.words.len(),
                list.preview(PREVIEW_LEN).join(", ")
            );
        }
    }
    Ok(())
}

fn print_words(words: &[Word]) {
    for word in words {
        let mark = if word.is_starred { "*" } else { " " };
        println!("{} {:<20} {:<20} {}", mark, word.en, word.phonetic, word.cn);
    }
}
