//! Integration tests: load fixture messages and run them through the transformer.

use std::path::Path;
use std::sync::mpsc;

use remotegate::config::Config;
use remotegate::model::message::ShowImages;
use remotegate::parser::eml::load_message;
use remotegate::remote::{
    Action, AllowList, ChannelSink, Grant, NoopSink, Policy, RemoteContentTransformer,
    RemoteInjected, RemoteSettings, RewriteStrategy, Route, TransformOptions, View,
};

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn blocking() -> RemoteContentTransformer {
    RemoteContentTransformer::new(Policy::new(RemoteSettings::default(), AllowList::default()))
}

fn allowing() -> RemoteContentTransformer {
    RemoteContentTransformer::new(Policy::new(
        RemoteSettings::from_bits(RemoteSettings::REMOTE),
        AllowList::default(),
    ))
}

fn automatic() -> TransformOptions {
    TransformOptions::new(Some(Action::parse("user.open")), View::Message)
}

fn manual() -> TransformOptions {
    TransformOptions::new(Some(Action::parse("user.inject")), View::Message)
}

// ─── Blocked by default ─────────────────────────────────────────────

#[test]
fn test_newsletter_blocked_by_default() {
    let mut parsed = load_message(fixture("newsletter.eml")).unwrap();
    let before = parsed.html.clone();

    let outcome = blocking()
        .transform(&mut parsed.html, &mut parsed.message, &automatic(), &mut NoopSink)
        .unwrap();

    assert!(!outcome.decision.show);
    assert_eq!(outcome.matches, 4);
    assert_eq!(outcome.route, Route::Blocked);
    assert_eq!(parsed.html, before);
    assert_eq!(parsed.message.show_images, ShowImages::Hidden);
}

// ─── Automatic rewrite ──────────────────────────────────────────────

#[test]
fn test_newsletter_unescaped_when_allowed() {
    let mut parsed = load_message(fixture("newsletter.eml")).unwrap();

    let outcome = allowing()
        .transform(&mut parsed.html, &mut parsed.message, &automatic(), &mut NoopSink)
        .unwrap();

    let body = parsed.html.inner_html();
    assert_eq!(outcome.route, Route::Rewritten { rewritten: 4 });
    assert_eq!(outcome.decision.grant, Some(Grant::Setting));
    assert!(body.contains(r#"<img src="https://cdn.example.com/header.png""#));
    assert!(body.contains("background: url(https://cdn.example.com/bg.png)"));
    assert!(body.contains(r#"<img srcset="https://cdn.example.com/hero.png 1x"#));
    assert!(body.contains(r#"<table background="https://cdn.example.com/table.png">"#));
    // Inline images stay escaped for the embedded pipeline.
    assert!(body.contains(r#"proton-src="cid:logo@example.com""#));
    assert_eq!(parsed.message.show_images, ShowImages::Shown);
}

#[test]
fn test_no_action_behaves_like_automatic() {
    let mut parsed = load_message(fixture("notify.eml")).unwrap();
    allowing()
        .transform(
            &mut parsed.html,
            &mut parsed.message,
            &TransformOptions::default(),
            &mut NoopSink,
        )
        .unwrap();
    assert!(parsed
        .html
        .inner_html()
        .contains(r#"src="https://protonmail.com/images/welcome.png""#));
}

#[test]
fn test_dom_strategy_matches_markup_strategy_on_newsletter() {
    let mut markup = load_message(fixture("newsletter.eml")).unwrap();
    let mut dom = markup.clone();

    allowing()
        .transform(&mut markup.html, &mut markup.message, &automatic(), &mut NoopSink)
        .unwrap();
    allowing()
        .with_strategy(RewriteStrategy::Dom)
        .transform(&mut dom.html, &mut dom.message, &automatic(), &mut NoopSink)
        .unwrap();

    assert_eq!(dom.html, markup.html);
    assert_eq!(dom.message.show_images, markup.message.show_images);
}

// ─── Allow-list and encryption ──────────────────────────────────────

#[test]
fn test_allow_listed_sender_loads_remote_content() {
    let mut parsed = load_message(fixture("notify.eml")).unwrap();
    let outcome = blocking()
        .transform(&mut parsed.html, &mut parsed.message, &automatic(), &mut NoopSink)
        .unwrap();
    assert_eq!(outcome.decision.grant, Some(Grant::AllowList));
    assert!(!parsed.html.inner_html().contains("proton-src"));
}

#[test]
fn test_allow_listed_sender_encrypted_stays_blocked() {
    let mut parsed = load_message(fixture("notify.eml")).unwrap();
    parsed.message.is_encrypted = true;
    let outcome = blocking()
        .transform(&mut parsed.html, &mut parsed.message, &automatic(), &mut NoopSink)
        .unwrap();
    assert!(!outcome.decision.show);
    assert!(parsed.html.inner_html().contains("proton-src"));
    assert_eq!(parsed.message.show_images, ShowImages::Hidden);
}

// ─── Print view ─────────────────────────────────────────────────────

#[test]
fn test_print_view_always_loads() {
    let mut parsed = load_message(fixture("newsletter.eml")).unwrap();
    parsed.message.is_encrypted = true;
    parsed.message.show_images = ShowImages::Hidden;

    let options = TransformOptions::new(None, View::Printer);
    let outcome = blocking()
        .transform(&mut parsed.html, &mut parsed.message, &options, &mut NoopSink)
        .unwrap();

    assert_eq!(outcome.decision.grant, Some(Grant::Printer));
    assert_eq!(parsed.message.show_images, ShowImages::Shown);
}

// ─── Sticky per-message flag ────────────────────────────────────────

#[test]
fn test_no_remote_content_keeps_flag_unset() {
    let mut parsed = load_message(fixture("no-remote.eml")).unwrap();
    let before = parsed.html.clone();
    let outcome = allowing()
        .transform(&mut parsed.html, &mut parsed.message, &automatic(), &mut NoopSink)
        .unwrap();
    assert_eq!(outcome.matches, 0);
    assert!(!outcome.flag_written);
    assert_eq!(parsed.message.show_images, ShowImages::Unset);
    assert_eq!(parsed.html, before);
}

#[test]
fn test_second_pass_reuses_shown_decision() {
    let mut parsed = load_message(fixture("newsletter.eml")).unwrap();
    let mut first = parsed.html.clone();
    allowing()
        .transform(&mut first, &mut parsed.message, &manual(), &mut NoopSink)
        .unwrap();
    assert_eq!(parsed.message.show_images, ShowImages::Shown);

    // The global setting is now off, but the message remembers its decision.
    let outcome = blocking()
        .transform(&mut parsed.html, &mut parsed.message, &automatic(), &mut NoopSink)
        .unwrap();
    assert_eq!(outcome.decision.grant, Some(Grant::Message));
    assert!(!parsed.html.inner_html().contains("proton-src=\"https"));
}

// ─── Manual injection ───────────────────────────────────────────────

#[test]
fn test_manual_injection_reports_newsletter() {
    let mut parsed = load_message(fixture("newsletter.eml")).unwrap();
    let before = parsed.html.clone();
    let (tx, rx) = mpsc::channel::<RemoteInjected>();

    let outcome = allowing()
        .transform(&mut parsed.html, &mut parsed.message, &manual(), &mut ChannelSink(tx))
        .unwrap();

    assert_eq!(parsed.html, before);
    assert_eq!(
        outcome.route,
        Route::Reported {
            elements: 4,
            published: true
        }
    );

    let event = rx.try_recv().unwrap();
    assert!(rx.try_recv().is_err(), "exactly one event");
    assert_eq!(event.action, "user.inject");
    assert!(!event.has_svg);
    assert_eq!(event.message.sender.address, "news@example.com");
    assert_eq!(event.message.show_images, ShowImages::Shown);

    // div (style only), header img, srcset img, table; the cid logo is skipped.
    assert!(event.list[0].is_empty());
    assert_eq!(
        event.list[1].get("proton-src"),
        Some("https://cdn.example.com/header.png")
    );
    assert!(event.list[2].get("proton-srcset").is_some());
    assert_eq!(
        event.list[3].get("proton-background"),
        Some("https://cdn.example.com/table.png")
    );
    assert!(event
        .list
        .iter()
        .all(|map| map.get("proton-src") != Some("cid:logo@example.com")));
}

#[test]
fn test_manual_injection_svg_body() {
    let mut parsed = load_message(fixture("body.html")).unwrap();
    let mut events: Vec<RemoteInjected> = Vec::new();

    allowing()
        .transform(
            &mut parsed.html,
            &mut parsed.message,
            &manual(),
            &mut |event: RemoteInjected| events.push(event),
        )
        .unwrap();

    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert!(event.has_svg);
    assert_eq!(event.list.len(), 2);
    assert_eq!(
        event.list[0].get("proton-xlink:href"),
        Some("https://cdn.example.com/i.svg")
    );
    assert_eq!(
        event.list[1].get("proton-poster"),
        Some("https://cdn.example.com/poster.png")
    );

    let json = serde_json::to_value(event.envelope()).unwrap();
    assert_eq!(json["type"], "remote.injected");
    assert_eq!(json["data"]["hasSVG"], true);
}

#[test]
fn test_manual_injection_blocked_publishes_nothing() {
    let mut parsed = load_message(fixture("newsletter.eml")).unwrap();
    let mut events: Vec<RemoteInjected> = Vec::new();
    blocking()
        .transform(
            &mut parsed.html,
            &mut parsed.message,
            &manual(),
            &mut |event: RemoteInjected| events.push(event),
        )
        .unwrap();
    assert!(events.is_empty());
}

// ─── Configuration ──────────────────────────────────────────────────

#[test]
fn test_transformer_from_config() {
    let config: Config = toml::from_str(
        r#"
[policy]
show_images = 1
allow_list = []

[rewrite]
strategy = "dom"
"#,
    )
    .unwrap();
    let transformer = RemoteContentTransformer::from_config(&config);
    assert!(transformer.policy().settings.remote);
    assert!(transformer.policy().allow_list.addresses().is_empty());
    assert_eq!(transformer.strategy(), RewriteStrategy::Dom);
}
