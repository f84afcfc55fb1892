// Placeholder until user accounts exist.
pub async fn fetch_user_handler() -> &'static str {
    "fetching user"
}
