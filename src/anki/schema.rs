//! Collection database layout (schema version 11)

use serde_json::{Value, json};

/// Collection schema version written into `col.ver`
pub const SCHEMA_VERSION: i64 = 11;

/// Table and index definitions, executed in order on an empty database
pub const CREATE_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE col (
        id      INTEGER PRIMARY KEY,
        crt     INTEGER NOT NULL,
        mod     INTEGER NOT NULL,
        scm     INTEGER NOT NULL,
        ver     INTEGER NOT NULL,
        dty     INTEGER NOT NULL,
        usn     INTEGER NOT NULL,
        ls      INTEGER NOT NULL,
        conf    TEXT NOT NULL,
        models  TEXT NOT NULL,
        decks   TEXT NOT NULL,
        dconf   TEXT NOT NULL,
        tags    TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE notes (
        id      INTEGER PRIMARY KEY,
        guid    TEXT NOT NULL,
        mid     INTEGER NOT NULL,
        mod     INTEGER NOT NULL,
        usn     INTEGER NOT NULL,
        tags    TEXT NOT NULL,
        flds    TEXT NOT NULL,
        sfld    INTEGER NOT NULL,
        csum    INTEGER NOT NULL,
        flags   INTEGER NOT NULL,
        data    TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE cards (
        id      INTEGER PRIMARY KEY,
        nid     INTEGER NOT NULL,
        did     INTEGER NOT NULL,
        ord     INTEGER NOT NULL,
        mod     INTEGER NOT NULL,
        usn     INTEGER NOT NULL,
        type    INTEGER NOT NULL,
        queue   INTEGER NOT NULL,
        due     INTEGER NOT NULL,
        ivl     INTEGER NOT NULL,
        factor  INTEGER NOT NULL,
        reps    INTEGER NOT NULL,
        lapses  INTEGER NOT NULL,
        left    INTEGER NOT NULL,
        odue    INTEGER NOT NULL,
        odid    INTEGER NOT NULL,
        flags   INTEGER NOT NULL,
        data    TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE revlog (
        id      INTEGER PRIMARY KEY,
        cid     INTEGER NOT NULL,
        usn     INTEGER NOT NULL,
        ease    INTEGER NOT NULL,
        ivl     INTEGER NOT NULL,
        lastIvl INTEGER NOT NULL,
        factor  INTEGER NOT NULL,
        time    INTEGER NOT NULL,
        type    INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE graves (
        usn     INTEGER NOT NULL,
        oid     INTEGER NOT NULL,
        type    INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX ix_notes_usn ON notes (usn)",
    "CREATE INDEX ix_cards_usn ON cards (usn)",
    "CREATE INDEX ix_revlog_usn ON revlog (usn)",
    "CREATE INDEX ix_cards_nid ON cards (nid)",
    "CREATE INDEX ix_cards_sched ON cards (did, queue, due)",
    "CREATE INDEX ix_revlog_cid ON revlog (cid)",
    "CREATE INDEX ix_notes_csum ON notes (csum)",
];

/// Collection-wide settings for the `col.conf` column
pub fn collection_conf(deck_id: i64, model_id: i64) -> Value {
    json!({
        "activeDecks": [deck_id],
        "curDeck": deck_id,
        "curModel": model_id.to_string(),
        "newSpread": 0,
        "collapseTime": 1200,
        "timeLim": 0,
        "estTimes": true,
        "dueCounts": true,
        "nextPos": 1,
        "sortType": "noteFld",
        "sortBackwards": false,
        "addToCur": true,
    })
}

/// Default options group for the `col.dconf` column
pub fn deck_options() -> Value {
    json!({
        "1": {
            "id": 1,
            "name": "Default",
            "mod": 0,
            "usn": 0,
            "maxTaken": 60,
            "autoplay": true,
            "timer": 0,
            "replayq": true,
            "dyn": false,
            "new": {
                "bury": true,
                "delays": [1, 10],
                "initialFactor": 2500,
                "ints": [1, 4, 7],
                "order": 1,
                "perDay": 20,
                "separate": true,
            },
            "lapse": {
                "delays": [10],
                "leechAction": 0,
                "leechFails": 8,
                "minInt": 1,
                "mult": 0,
            },
            "rev": {
                "bury": true,
                "ease4": 1.3,
                "fuzz": 0.05,
                "ivlFct": 1,
                "maxIvl": 36500,
                "minSpace": 1,
                "perDay": 100,
            },
        }
    })
}
