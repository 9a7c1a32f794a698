//! Feed command: render the current subscription state

use crate::feed::FeedState;
use tokio::sync::watch;

/// Handle `feed`: print the feed as the subscription currently sees it
pub fn handle_feed(feed: &watch::Receiver<FeedState>) {
    match &*feed.borrow() {
        FeedState::Loading => println!("Loading audio feed..."),
        FeedState::Error(e) => println!("Error loading audio feed: {}", e),
        FeedState::Ready(items) if items.is_empty() => println!("No clips posted yet."),
        FeedState::Ready(items) => {
            println!("Audio Feed ({} clips)", items.len());
            for item in items {
                println!("----------------------------------------");
                println!("User: {} ({})", item.short_user(), item.user);
                println!("  {}", item.media_url);
                println!("  Duration: {}s", item.duration_secs);
                println!("  Posted at: {}", item.posted_at.format("%Y-%m-%d %H:%M:%S"));
            }
        }
    }
}
