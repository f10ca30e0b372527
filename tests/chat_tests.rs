// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use std::sync::Arc;
use waypoint_tracker::error::AppError;
use waypoint_tracker::services::{ChatAuthor, ChatLedger};

#[test]
fn test_chat_is_newest_first() {
    let chat = ChatLedger::new(ChatAuthor::new("member-1", "Me"));
    for text in ["good morning", "  anyone at the north gate?  ", "on my way"] {
        chat.add_draft_text(text);
        chat.send().unwrap();
    }

    let messages = chat.messages();
    let texts: Vec<&str> = messages.iter().map(|m| m.message.as_str()).collect();
    assert_eq!(
        texts,
        vec!["on my way", "anyone at the north gate?", "good morning"]
    );
    assert!(messages.windows(2).all(|w| w[0].sent_at >= w[1].sent_at));
}

#[test]
fn test_blank_send_leaves_room_untouched() {
    let chat = ChatLedger::new(ChatAuthor::new("member-1", "Me"));
    chat.add_draft_text("hi");
    chat.send().unwrap();

    chat.add_draft_text("   ");
    assert!(matches!(chat.send(), Err(AppError::EmptyComment)));
    assert_eq!(chat.messages().len(), 1);
}

#[test]
fn test_concurrent_senders_all_recorded() {
    let chat = Arc::new(ChatLedger::new(ChatAuthor::new("member-1", "Me")));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let chat = chat.clone();
            std::thread::spawn(move || {
                chat.add_draft_text(format!("message {}", i));
                // Another thread may have sent this draft already.
                let _ = chat.send();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let messages = chat.messages();
    assert!(!messages.is_empty() && messages.len() <= 4);
    assert!(chat.draft().is_empty());
}
