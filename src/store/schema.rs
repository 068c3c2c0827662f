pub const SCHEMA: &str = r#"
-- Forms are created as drafts and activated once
CREATE TABLE IF NOT EXISTS forms (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    name_key TEXT NOT NULL UNIQUE,  -- Unicode-lowercased name
    description TEXT,
    schema TEXT NOT NULL,           -- JSON document, opaque to the core
    status TEXT NOT NULL DEFAULT 'draft',
    created_at TEXT NOT NULL,
    url TEXT
);

-- Users are seeded from outside the workflow; the core only reads them
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL COLLATE NOCASE UNIQUE,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'normal_user',
    status TEXT NOT NULL DEFAULT 'active'
);

-- Who owes a response to which form
CREATE TABLE IF NOT EXISTS assignments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    form_id INTEGER NOT NULL REFERENCES forms(id),
    user_id INTEGER NOT NULL REFERENCES users(id),
    assigned_by INTEGER NOT NULL,   -- not a foreign key: the assigner may be gone
    assigned_at TEXT NOT NULL,

    UNIQUE(form_id, user_id)
);

-- Responses outlive the assignment they were submitted under
CREATE TABLE IF NOT EXISTS responses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    form_id INTEGER NOT NULL REFERENCES forms(id),
    user_id INTEGER NOT NULL,
    data TEXT NOT NULL,             -- JSON document
    file_path TEXT,
    is_spam INTEGER NOT NULL DEFAULT 0,
    submitted_at TEXT NOT NULL
);

-- At most one decision per response; no row means pending
CREATE TABLE IF NOT EXISTS approvals (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    response_id INTEGER NOT NULL UNIQUE REFERENCES responses(id),
    status TEXT NOT NULL,
    comment TEXT,
    decided_by INTEGER NOT NULL,
    decided_at TEXT NOT NULL
);

-- Create indexes
CREATE INDEX IF NOT EXISTS idx_forms_status ON forms(status);
CREATE INDEX IF NOT EXISTS idx_assignments_user ON assignments(user_id);
CREATE INDEX IF NOT EXISTS idx_responses_form_user ON responses(form_id, user_id);
CREATE INDEX IF NOT EXISTS idx_responses_spam ON responses(is_spam);
CREATE INDEX IF NOT EXISTS idx_approvals_status ON approvals(status);
"#;
