table! {
    notes (id) {
        #[sql_name = "_id"]
        id -> BigInt,
        title -> Nullable<Text>,
        #[sql_name = "note"]
        body -> Nullable<Text>,
        folder -> Nullable<Text>,
    }
}
