use anyhow::{bail, Context};
use dotenvy::dotenv;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use adapter::{ChatClient, GoTrueAuth, IdentityProvider, MicrolinkClient, ProvidedTokenWidget};
use domain::AuthEvent;
use server::Settings;
use storage::{CommentsClient, RestStore};
use widget::{
    CapabilityGate, CommentSection, PreviewFetcher, RenderPipeline, Stagger, SubmitOutcome,
    VerificationGate,
};

const USAGE: &str = "usage: client [list | post <body> | ask <message>]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let settings = Settings::new().context("Failed to load configuration")?;

    let mut args = std::env::args().skip(1);
    let command = args.next();
    let rest = args.collect::<Vec<_>>().join(" ");

    match command.as_deref() {
        None | Some("list") => show_comments(&settings, None).await,
        Some("post") => show_comments(&settings, Some(rest)).await,
        Some("ask") => ask(&settings, &rest).await,
        Some(other) => bail!("unknown command '{}'\n{}", other, USAGE),
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

async fn show_comments(settings: &Settings, draft: Option<String>) -> anyhow::Result<()> {
    let Some(creds) = settings.store_credentials() else {
        bail!("Set FOLIO_STORE__URL and FOLIO_STORE__ANON_KEY to load comments");
    };

    let auth = Arc::new(GoTrueAuth::new(creds.url, creds.anon_key, None)?);
    match env_value("FOLIO_ACCESS_TOKEN") {
        Some(token) => {
            auth.restore(token.trim(), env_value("FOLIO_REFRESH_TOKEN"))
                .await
                .context("Access token was rejected")?;
        }
        None => auth.start_anonymous().await,
    }

    let gate = CapabilityGate::new(false);
    let gate_view = gate.apply(&AuthEvent::InitialSession(auth.get_session().await));
    println!("{}", gate_view.affordance.to_html());

    let widget = Arc::new(ProvidedTokenWidget::new(env_value("FOLIO_VERIFICATION_TOKEN")));
    let verification = VerificationGate::new(settings.verification_config(), Some(widget));
    let previews = PreviewFetcher::new(Arc::new(MicrolinkClient::new(&settings.preview.endpoint)?));
    let pipeline = RenderPipeline::new(settings.clock()).with_animation(Some(Stagger::default()));

    let mut section = CommentSection::new(
        CommentsClient::new(RestStore::new(creds.url, creds.anon_key)?),
        pipeline,
        auth.clone(),
        verification,
    )
    .with_previews(previews);
    section.apply_gate(&gate_view);
    section.mount().await;

    if let Some(draft) = draft {
        let form = section.form_mut();
        form.draft = draft;
        form.background_color = env_value("FOLIO_COMMENT_COLOR");
        form.font_family = env_value("FOLIO_COMMENT_FONT");

        match section.submit().await {
            SubmitOutcome::Posted => eprintln!("Comment posted."),
            other => eprintln!("Comment not posted: {:?}", other),
        }
    }

    section.wait_for_previews().await;
    let view = section.view();
    let view = view.lock().await;
    println!("{}", view.head_html());
    println!("{}", view.to_html());
    Ok(())
}

async fn ask(settings: &Settings, message: &str) -> anyhow::Result<()> {
    let Some(creds) = settings.store_credentials() else {
        bail!("Set FOLIO_STORE__URL and FOLIO_STORE__ANON_KEY to reach the chat function");
    };
    let chat = ChatClient::new(creds.url, creds.anon_key)?;
    match chat.ask(message).await {
        Some(reply) => println!("{}", reply),
        None => bail!("Nothing to ask\n{}", USAGE),
    }
    Ok(())
}
