use clap::Parser;
use publishly_client::{Post, PostDraft, PublishlyClient};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[clap(name = "publishly", about = "Command-line client for a Publishly server")]
struct Cli {
    #[clap(short, long, default_value = "http://127.0.0.1:8080")]
    server: String,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Parser, Debug)]
enum Command {
    Signup {
        #[clap(long)]
        name: String,
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
    },
    Login {
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
    },
    Logout,
    Me,
    Feed {
        #[clap(long)]
        limit: Option<u32>,
        #[clap(long)]
        offset: Option<u32>,
    },
    /// Creates the post, or updates it when the title's slug is already yours.
    Write {
        #[clap(long)]
        title: String,
        #[clap(long)]
        content: String,
        #[clap(long)]
        excerpt: Option<String>,
        #[clap(long)]
        cover_image: Option<String>,
        #[clap(long = "tag")]
        tags: Vec<String>,
        #[clap(long)]
        publish: bool,
    },
    Drafts,
    Read {
        slug: String,
    },
    Like {
        post_id: Uuid,
    },
    Comments {
        post_id: Uuid,
    },
    Comment {
        post_id: Uuid,
        #[clap(long)]
        content: String,
    },
    Search {
        query: String,
    },
    Tag {
        slug: String,
    },
    Profile {
        user_id: Uuid,
    },
    Follow {
        user_id: Uuid,
    },
}

fn print_posts(posts: &[Post]) {
    println!("Posts ({})", posts.len());
    for post in posts {
        println!("- [{}] {} ({})", post.id, post.title, post.slug);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();
    let mut client = PublishlyClient::connect(&args.server)?;

    match args.command {
        Command::Signup {
            name,
            email,
            password,
        } => {
            let user = client.signup(&name, &email, &password).await?;
            println!("Account created for {} ({})", user.name, user.id);
        }
        Command::Login { email, password } => {
            let user = client.login(&email, &password).await?;
            println!("Logged in as {}", user.name);
        }
        Command::Logout => {
            client.logout().await?;
            println!("Logged out");
        }
        Command::Me => match client.me().await? {
            Some(user) => println!("{} <{}> ({})", user.name, user.email, user.id),
            None => println!("Not logged in"),
        },
        Command::Feed { limit, offset } => {
            print_posts(&client.feed(limit, offset).await?);
        }
        Command::Write {
            title,
            content,
            excerpt,
            cover_image,
            tags,
            publish,
        } => {
            let draft = PostDraft {
                title,
                content,
                excerpt,
                cover_image,
                tags,
                publish,
            };
            let post = client.save_post(&draft).await?;
            println!("Saved {} ({})", post.slug, post.id);
        }
        Command::Drafts => print_posts(&client.drafts().await?),
        Command::Read { slug } => {
            let post = client.get_post(&slug).await?;
            println!("{post}");
            println!();
            println!("{}", post.content);
        }
        Command::Like { post_id } => {
            let state = client.toggle_like(post_id).await?;
            println!(
                "{} ({} likes)",
                state.action.as_deref().unwrap_or("unchanged"),
                state.like_count
            );
        }
        Command::Comments { post_id } => {
            for comment in client.comments(post_id).await? {
                let author = comment
                    .author
                    .as_ref()
                    .map(|a| a.name.as_str())
                    .unwrap_or("unknown");
                println!("[{}] {author}: {}", comment.created_at, comment.content);
            }
        }
        Command::Comment { post_id, content } => {
            let comment = client.add_comment(post_id, &content).await?;
            println!("Comment added ({})", comment.id);
        }
        Command::Search { query } => print_posts(&client.search(&query).await?),
        Command::Tag { slug } => {
            let page = client.tag(&slug).await?;
            println!("#{}", page.tag.name);
            print_posts(&page.posts);
        }
        Command::Profile { user_id } => {
            let profile = client.profile(user_id).await?;
            println!(
                "{} | {} followers | {} following",
                profile.name, profile.follower_count, profile.following_count
            );
            if let Some(bio) = &profile.bio {
                println!("{bio}");
            }
            print_posts(&profile.posts);
        }
        Command::Follow { user_id } => {
            let state = client.toggle_follow(user_id).await?;
            println!(
                "{} ({} followers)",
                state.action.as_deref().unwrap_or("unchanged"),
                state.follower_count
            );
        }
    }

    Ok(())
}
