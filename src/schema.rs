// Diesel table definitions shared by the SQLite and PostgreSQL stores.
// Column types are the common subset of both dialects: dates are ISO text.

diesel::table! {
    tasks (id) {
        id -> Integer,
        name -> Text,
        parent_id -> Nullable<Integer>,
        time_minutes -> Integer,
        position -> Integer,
    }
}

diesel::table! {
    daily_progress (id) {
        id -> Integer,
        task_id -> Integer,
        date -> Text,
        completed -> Bool,
        time_spent -> Integer,
    }
}

diesel::table! {
    timer_sessions (id) {
        id -> Integer,
        task_id -> Integer,
        date -> Text,
        duration -> Integer,
        timestamp -> Timestamp,
    }
}

diesel::allow_tables_to_appear_in_same_query!(daily_progress, tasks, timer_sessions);
