// Mirrors the hosted database schema. Regenerate with `diesel print-schema` when it changes.

diesel::table! {
    admin_login_logs (id) {
        id -> Uuid,
        user_id -> Uuid,
        ip_address -> Nullable<Text>,
        location -> Nullable<Jsonb>,
        user_agent -> Nullable<Text>,
        login_time -> Timestamptz,
    }
}

diesel::table! {
    app_banners (id) {
        id -> Uuid,
        title -> Varchar,
        image_url -> Text,
        target_type -> Varchar,
        target_value -> Nullable<Text>,
        display_order -> Int4,
        is_active -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    app_notifications (id) {
        id -> Uuid,
        title -> Varchar,
        message -> Text,
        #[sql_name = "type"]
        notification_type -> Varchar,
        target_audience -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    audit_logs (id) {
        id -> Uuid,
        action -> Varchar,
        table_name -> Nullable<Varchar>,
        record_id -> Nullable<Varchar>,
        details -> Nullable<Jsonb>,
        user_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    content (id) {
        id -> Uuid,
        title -> Varchar,
        title_hi -> Nullable<Varchar>,
        #[sql_name = "type"]
        content_type -> Varchar,
        language -> Varchar,
        is_free -> Bool,
        file_url -> Nullable<Text>,
        file_size -> Nullable<Int8>,
        page_count -> Nullable<Int4>,
        content_text -> Nullable<Text>,
        description_en -> Nullable<Text>,
        description_hi -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    news (id) {
        id -> Uuid,
        title -> Text,
        link -> Text,
        description -> Nullable<Text>,
        pub_date -> Nullable<Timestamptz>,
        source -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    payments (id) {
        id -> Uuid,
        user_id -> Uuid,
        amount -> Int8,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    questions (id) {
        id -> Uuid,
        question_text -> Text,
        question_text_hi -> Nullable<Text>,
        option_a -> Text,
        option_a_hi -> Nullable<Text>,
        option_b -> Text,
        option_b_hi -> Nullable<Text>,
        option_c -> Text,
        option_c_hi -> Nullable<Text>,
        option_d -> Text,
        option_d_hi -> Nullable<Text>,
        #[max_length = 1]
        correct_answer -> Varchar,
        subject -> Varchar,
        topic -> Nullable<Varchar>,
        #[max_length = 20]
        difficulty -> Varchar,
        explanation -> Nullable<Text>,
        explanation_hi -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    settings (key) {
        key -> Varchar,
        value -> Jsonb,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    study_templates (id) {
        id -> Uuid,
        title -> Varchar,
        description -> Nullable<Text>,
        tasks -> Jsonb,
        is_active -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    test_attempts (id) {
        id -> Uuid,
        user_id -> Uuid,
        test_id -> Uuid,
        score -> Nullable<Float8>,
        status -> Varchar,
        completed_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    test_questions (test_id, question_id) {
        test_id -> Uuid,
        question_id -> Uuid,
        order_index -> Int4,
    }
}

diesel::table! {
    tests (id) {
        id -> Uuid,
        title -> Varchar,
        title_hi -> Nullable<Varchar>,
        description -> Nullable<Text>,
        slug -> Varchar,
        #[max_length = 20]
        test_type -> Varchar,
        duration_minutes -> Int4,
        total_marks -> Int4,
        passing_marks -> Int4,
        #[max_length = 20]
        difficulty -> Varchar,
        is_free -> Bool,
        total_questions -> Int4,
        total_attempts -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    user_reports (id) {
        id -> Uuid,
        user_id -> Uuid,
        #[sql_name = "type"]
        report_type -> Varchar,
        target_id -> Nullable<Varchar>,
        message -> Text,
        #[max_length = 20]
        status -> Varchar,
        admin_note -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    users (id) {
        id -> Uuid,
        phone -> Varchar,
        email -> Nullable<Varchar>,
        name -> Nullable<Varchar>,
        #[max_length = 20]
        plan -> Varchar,
        exam_type -> Nullable<Varchar>,
        coins -> Int4,
        streak_days -> Int4,
        created_at -> Timestamptz,
        last_active_date -> Nullable<Timestamptz>,
    }
}

diesel::joinable!(admin_login_logs -> users (user_id));
diesel::joinable!(test_questions -> questions (question_id));
diesel::joinable!(test_questions -> tests (test_id));
diesel::joinable!(test_attempts -> tests (test_id));

diesel::allow_tables_to_appear_in_same_query!(
    admin_login_logs,
    app_banners,
    app_notifications,
    audit_logs,
    content,
    news,
    payments,
    questions,
    settings,
    study_templates,
    test_attempts,
    test_questions,
    tests,
    user_reports,
    users,
);
