//! Game store database schema.

/// SQL to create all game tables.
pub const CREATE_TABLES: &str = r"
CREATE TABLE IF NOT EXISTS rooms (
    id              UUID PRIMARY KEY,
    code            VARCHAR(16) NOT NULL UNIQUE,
    name            VARCHAR(255) NOT NULL,
    capacity        INT NOT NULL,
    status          VARCHAR(16) NOT NULL,
    round           INT NOT NULL DEFAULT 0,
    time_limit_secs INT NOT NULL,
    creator         UUID NOT NULL,
    word_pool       UUID[] NOT NULL DEFAULT '{}',
    winner          UUID,
    created_at      TIMESTAMPTZ NOT NULL,
    started_at      TIMESTAMPTZ,
    finished_at     TIMESTAMPTZ
);

CREATE INDEX IF NOT EXISTS idx_rooms_status ON rooms (status);

CREATE TABLE IF NOT EXISTS players (
    id            UUID PRIMARY KEY,
    user_id       UUID NOT NULL,
    room_id       UUID NOT NULL REFERENCES rooms (id),
    position      INT NOT NULL,
    status        VARCHAR(16) NOT NULL,
    join_status   VARCHAR(16) NOT NULL,
    kills         INT NOT NULL DEFAULT 0,
    target        UUID,
    words         JSONB,
    eliminated_at TIMESTAMPTZ,
    UNIQUE (room_id, position),
    UNIQUE (room_id, user_id)
);

CREATE INDEX IF NOT EXISTS idx_players_room_id ON players (room_id);

CREATE TABLE IF NOT EXISTS kill_confirmations (
    id           UUID PRIMARY KEY,
    room_id      UUID NOT NULL REFERENCES rooms (id),
    killer       UUID NOT NULL REFERENCES players (id),
    target       UUID NOT NULL REFERENCES players (id),
    status       VARCHAR(16) NOT NULL,
    claim        JSONB NOT NULL,
    created_at   TIMESTAMPTZ NOT NULL,
    responded_at TIMESTAMPTZ
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_confirmations_one_pending_per_killer
    ON kill_confirmations (killer)
    WHERE status = 'pending';

CREATE TABLE IF NOT EXISTS game_logs (
    id         UUID PRIMARY KEY,
    room_id    UUID NOT NULL,
    kind       VARCHAR(32) NOT NULL,
    message    TEXT NOT NULL,
    payload    JSONB,
    player     UUID,
    target     UUID,
    created_at TIMESTAMPTZ NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_game_logs_room_id ON game_logs (room_id, created_at);

CREATE TABLE IF NOT EXISTS words (
    id     UUID PRIMARY KEY,
    text   VARCHAR(255) NOT NULL,
    active BOOLEAN NOT NULL DEFAULT TRUE
);

CREATE TABLE IF NOT EXISTS user_stats (
    user_id      UUID PRIMARY KEY,
    games_played INT NOT NULL DEFAULT 0,
    games_won    INT NOT NULL DEFAULT 0,
    total_kills  INT NOT NULL DEFAULT 0
);
";
