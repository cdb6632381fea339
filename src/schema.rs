// Modoboa owns admin_domain, admin_mailbox and core_user; only the columns
// read here are declared.

table! {
    use diesel::sql_types::*;
    admin_domain (id) {
        id -> Int4,
        name -> Varchar,
    }
}

table! {
    use diesel::sql_types::*;
    admin_mailbox (id) {
        id -> Int4,
        address -> Varchar,
        domain_id -> Int4,
        user_id -> Int4,
    }
}

table! {
    use diesel::sql_types::*;
    core_user (id) {
        id -> Int4,
        first_name -> Varchar,
        last_name -> Varchar,
        email -> Varchar,
    }
}

table! {
    use diesel::sql_types::*;
    postfix_autoreply_armessage (id) {
        id -> Int4,
        mbox_id -> Int4,
        subject -> Varchar,
        content -> Text,
        enabled -> Bool,
        fromdate -> Timestamptz,
        untildate -> Nullable<Timestamptz>,
    }
}

table! {
    use diesel::sql_types::*;
    postfix_autoreply_arhistoric (id) {
        id -> Int4,
        armessage_id -> Int4,
        last_sent -> Timestamptz,
        sender -> Varchar,
    }
}

joinable!(admin_mailbox -> admin_domain (domain_id));
joinable!(admin_mailbox -> core_user (user_id));
joinable!(postfix_autoreply_armessage -> admin_mailbox (mbox_id));
joinable!(postfix_autoreply_arhistoric -> postfix_autoreply_armessage (armessage_id));

allow_tables_to_appear_in_same_query!(
    admin_domain,
    admin_mailbox,
    core_user,
    postfix_autoreply_armessage,
    postfix_autoreply_arhistoric,
);
