//! Diesel schema for message persistence.

diesel::table! {
    /// Player-submitted messages.
    messages (id) {
        /// Store-assigned surrogate key.
        id -> Int8,
        /// Submitting player's UUID.
        player_id -> Uuid,
        /// Message text.
        #[max_length = 256]
        text -> Varchar,
    }
}
