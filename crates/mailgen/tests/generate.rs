//! End-to-end rendering with the bundled themes.

use mailgen::{
    Action, Button, Email, EmailBody, GeneratorConfig, Mailgen, MailgenError, Product, Table,
};
use proptest::prelude::*;
use serde_json::json;

fn acme(theme: &str) -> Mailgen {
    Mailgen::new(GeneratorConfig::new(Product::new("Acme", "https://acme.test")).theme(theme))
        .unwrap()
}

fn welcome() -> Email {
    Email::new(
        EmailBody::new()
            .name("Jane Doe")
            .intro("Welcome to Acme! We're very excited to have you on board.")
            .entry("Plan", "Pro")
            .table(
                Table::new()
                    .title("Invoice")
                    .row([("item", "Widget"), ("price", "$10.99")])
                    .row([("item", "Gadget"), ("price", "$5.00")])
                    .align("price", "right"),
            )
            .action(Action::new(
                "To get started with Acme, please click here:",
                Button::new("Confirm your account", "https://acme.test/confirm?s=d9729feb")
                    .color("#22BC66"),
            ))
            .outro("Need help? Just reply to this email."),
    )
}

#[test]
fn test_acme_plaintext_end_to_end() {
    let text = acme("default")
        .generate_plaintext(&json!({ "body": { "intro": "Welcome" } }))
        .unwrap();

    assert_eq!(
        text,
        "Hi,\n\nWelcome\n\nYours truly,\nAcme\n\n© Acme. All rights reserved.\nhttps://acme.test"
    );
    assert!(!text.contains('<'));
}

#[test]
fn test_default_plaintext_full_body() {
    let text = acme("default").generate_plaintext(&welcome()).unwrap();

    assert!(text.starts_with("Hi Jane Doe,\n"));
    // Plaintext is never HTML-escaped.
    assert!(text.contains("We're very excited"));
    assert!(text.contains("Plan: Pro\n"));
    assert!(text.contains("Invoice\n"));
    assert!(text.contains("Item: Widget | Price: $10.99\n"));
    assert!(text.contains("To get started with Acme, please click here:\nhttps://acme.test/confirm?s=d9729feb\n"));
    assert!(text.contains("Need help? Just reply to this email."));
}

#[test]
fn test_default_html_inlines_styles() {
    let html = acme("default").generate(&welcome()).unwrap();

    assert!(html.contains(r#"<body dir="ltr" style="#));
    assert!(html.contains("Hi Jane Doe,</h1>"));
    assert!(!html.contains("We're very excited"));
    assert!(html.contains("<dt style="));
    assert!(html.contains(">Widget</td>"));
    assert!(html.contains(r#"align="right""#));
    // The button's own colour beats the stylesheet's.
    assert!(html.contains("background-color: #22BC66;"));
    assert!(html.contains(">Confirm your account</a>"));

    // Only media queries and pseudo-class rules survive, in one block.
    assert_eq!(html.matches("<style").count(), 1);
    assert!(html.contains("@media only screen and (max-width: 600px)"));
    assert!(html.contains("a.button:hover"));
    assert!(!html.contains(".email-wrapper {"));
}

#[test]
fn test_salted_theme() {
    let mailgen = acme("salted");
    let email = welcome();

    let html = mailgen.generate(&email).unwrap();
    assert!(html.contains(r#"class="cta-button""#));
    assert!(html.contains("border-radius: 24px;"));
    assert!(html.contains(".cta-button:hover"));

    let text = mailgen.generate_plaintext(&email).unwrap();
    assert!(text.starts_with("Acme\nhttps://acme.test\n"));
    assert!(text.contains("* Plan: Pro\n"));
    assert!(text.contains("INVOICE\n"));
    assert!(text.contains("Confirm your account: https://acme.test/confirm?s=d9729feb\n"));
}

#[test]
fn test_logo_and_copyright() {
    let product = Product::new("Acme", "https://acme.test")
        .logo("https://acme.test/logo.png")
        .copyright("Copyright © 2026 Acme Inc.");
    let mailgen = Mailgen::new(GeneratorConfig::new(product)).unwrap();
    let request = json!({ "body": { "name": "Jane" } });

    let html = mailgen.generate(&request).unwrap();
    assert!(html.contains("logo.png"));
    assert!(html.contains(r#"class="email-logo""#));

    let text = mailgen.generate_plaintext(&request).unwrap();
    assert!(text.contains("Copyright © 2026 Acme Inc."));
    assert!(!text.contains("All rights reserved"));
}

#[test]
fn test_title_replaces_greeting() {
    let request = json!({ "body": { "name": "Jane", "title": "Your order has shipped" } });
    let text = acme("default").generate_plaintext(&request).unwrap();
    assert!(text.starts_with("Your order has shipped\n"));
    assert!(!text.contains("Hi Jane"));
}

#[test]
fn test_body_product_overrides_for_one_call() {
    let mailgen = acme("default");

    let text = mailgen
        .generate_plaintext(&json!({ "body": { "product": { "name": "Other", "link": "https://other.test" } } }))
        .unwrap();
    assert!(text.contains("https://other.test"));

    let text = mailgen.generate_plaintext(&json!({ "body": {} })).unwrap();
    assert!(text.contains("https://acme.test"));
}

#[test]
fn test_request_validation() {
    let mailgen = acme("default");

    assert!(matches!(
        mailgen.generate(&serde_json::Value::Null),
        Err(MailgenError::MissingParams)
    ));
    assert!(matches!(
        mailgen.generate(&json!({ "body": null })),
        Err(MailgenError::MissingBody)
    ));
    assert!(matches!(
        mailgen.generate_plaintext(&json!({ "body": "x" })),
        Err(MailgenError::MissingBody)
    ));
    assert!(mailgen.generate(&json!({ "body": {} })).is_ok());
}

#[test]
fn test_render_matches_individual_variants() {
    let mailgen = acme("salted");
    let email = welcome();

    let rendered = mailgen.render(&email).unwrap();
    assert_eq!(rendered.html, mailgen.generate(&email).unwrap());
    assert_eq!(rendered.text, mailgen.generate_plaintext(&email).unwrap());
}

#[test]
fn test_concurrent_renders_are_identical() {
    let mailgen = acme("default");
    let email = welcome();
    let expected = mailgen.render(&email).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| mailgen.render(&email).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_render_is_pure(
        name in "[A-Za-z ]{0,20}",
        intro in prop::collection::vec("[ -~]{0,40}", 0..4),
    ) {
        let mailgen = acme("default");
        let request = json!({ "body": { "name": name, "intro": intro } });

        let first = mailgen.render(&request).unwrap();
        let second = mailgen.render(&request).unwrap();
        prop_assert_eq!(first, second);
    }
}
