use clap::{Parser, Subcommand};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde_json::Value;
use url::Url;

#[derive(Parser)]
#[command(name = "posts-cli")]
#[command(about = "Command-line client for the posts proxy", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the proxy answers at all
    Hello,
    /// List all posts
    List,
    /// Show a single post
    Get { id: String },
    /// Create a post from a JSON document
    Create { json: String },
    /// Replace a post with a JSON document
    Update { id: String, json: String },
    /// Delete a post
    Delete { id: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let (method, url, body) = match cli.command {
        Commands::Hello => {
            let text = client.get(Url::parse(&cli.url)?).send().await?.text().await?;
            println!("{}", text);
            return Ok(());
        }
        Commands::List => (Method::GET, posts_url(&cli.url, None)?, None),
        Commands::Get { id } => (Method::GET, posts_url(&cli.url, Some(&id))?, None),
        Commands::Create { json } => (Method::POST, posts_url(&cli.url, None)?, Some(parse_json(&json)?)),
        Commands::Update { id, json } => (Method::PUT, posts_url(&cli.url, Some(&id))?, Some(parse_json(&json)?)),
        Commands::Delete { id } => (Method::DELETE, posts_url(&cli.url, Some(&id))?, None),
    };

    let mut req = client.request(method, url);
    if let Some(body) = body {
        req = req
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body.to_string());
    }

    print_response(req.send().await?).await
}

/// `<base>/posts`, or `<base>/posts/<id>` with `id` encoded as one segment.
fn posts_url(base: &str, id: Option<&str>) -> Result<Url, Box<dyn std::error::Error>> {
    let mut url = Url::parse(base)?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| format!("Cannot use '{}' as a base URL", base))?;
        segments.pop_if_empty().push("posts");
        if let Some(id) = id {
            segments.push(id);
        }
    }
    Ok(url)
}

fn parse_json(raw: &str) -> Result<Value, Box<dyn std::error::Error>> {
    serde_json::from_str(raw).map_err(|e| format!("Invalid JSON argument: {}", e).into())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: proxy returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let text = res.text().await?;
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posts_url() {
        let url = posts_url("http://localhost:8080", None).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/posts");

        let url = posts_url("http://localhost:8080/", Some("42")).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/posts/42");
    }

    #[test]
    fn test_id_is_a_single_encoded_segment() {
        let url = posts_url("http://localhost:8080", Some("a/b")).unwrap();
        assert_eq!(url.path(), "/posts/a%2Fb");
        assert_eq!(url.query(), None);

        let url = posts_url("http://localhost:8080", Some("x?y#z")).unwrap();
        assert_eq!(url.path(), "/posts/x%3Fy%23z");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_rejects_non_base_url() {
        assert!(posts_url("mailto:someone@example.com", None).is_err());
        assert!(posts_url("not a url", None).is_err());
    }
}
