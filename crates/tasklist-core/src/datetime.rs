use anyhow::anyhow;
use chrono::{
  DateTime,
  Local,
  Utc
};
use chrono_tz::Tz;

pub const DEFAULT_DATE_FORMAT: &str =
  "%d/%m/%Y %I:%M:%S";
pub const UNSET_TIMESTAMP: &str =
  "-----";

/// Timezone used when showing
/// timestamps to the user.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DisplayZone {
  Local,
  Named(Tz)
}

impl DisplayZone {
  pub fn parse(
    raw: Option<&str>
  ) -> anyhow::Result<Self> {
    let Some(raw) = raw else {
      return Ok(DisplayZone::Local);
    };

    let trimmed = raw.trim();
    if trimmed.is_empty()
      || trimmed
        .eq_ignore_ascii_case("local")
    {
      return Ok(DisplayZone::Local);
    }

    match trimmed.parse::<Tz>() {
      | Ok(tz) => {
        tracing::debug!(
          timezone = %trimmed,
          "resolved display timezone"
        );
        Ok(DisplayZone::Named(tz))
      }
      | Err(err) => {
        Err(anyhow!(
          "invalid date.timezone \
           {trimmed}: {err}"
        ))
      }
    }
  }

  #[must_use]
  pub fn format(
    self,
    dt: DateTime<Utc>,
    fmt: &str
  ) -> String {
    match self {
      | DisplayZone::Local => {
        dt.with_timezone(&Local)
          .format(fmt)
          .to_string()
      }
      | DisplayZone::Named(tz) => {
        dt.with_timezone(&tz)
          .format(fmt)
          .to_string()
      }
    }
  }

  #[must_use]
  pub fn format_opt(
    self,
    dt: Option<DateTime<Utc>>,
    fmt: &str
  ) -> String {
    dt.map(|value| {
      self.format(value, fmt)
    })
    .unwrap_or_else(|| {
      UNSET_TIMESTAMP.to_string()
    })
  }
}


pub mod compact_date_serde {
  use chrono::{
    DateTime,
    NaiveDateTime,
    Utc
  };
  use serde::{
    Deserialize,
    Deserializer,
    Serializer
  };

  const FORMAT: &str =
    "%Y%m%dT%H%M%SZ";

  pub fn serialize<S>(
    dt: &DateTime<Utc>,
    serializer: S
  ) -> Result<S::Ok, S::Error>
  where
    S: Serializer
  {
    serializer.serialize_str(
      &dt.format(FORMAT).to_string()
    )
  }

  pub fn deserialize<'de, D>(
    deserializer: D
  ) -> Result<DateTime<Utc>, D::Error>
  where
    D: Deserializer<'de>
  {
    let raw = String::deserialize(
      deserializer
    )?;
    NaiveDateTime::parse_from_str(
      &raw, FORMAT
    )
    .map(|ndt| {
      DateTime::<Utc>::from_naive_utc_and_offset(ndt, Utc)
    })
    .map_err(serde::de::Error::custom)
  }

  pub mod option {
    use chrono::{
      DateTime,
      Utc
    };
    use serde::{
      Deserialize,
      Deserializer,
      Serializer
    };

    pub fn serialize<S>(
      dt: &Option<DateTime<Utc>>,
      serializer: S
    ) -> Result<S::Ok, S::Error>
    where
      S: Serializer
    {
      match dt {
        | Some(value) => {
          super::serialize(
            value, serializer
          )
        }
        | None => {
          serializer.serialize_none()
        }
      }
    }

    pub fn deserialize<'de, D>(
      deserializer: D
    ) -> Result<
      Option<DateTime<Utc>>,
      D::Error
    >
    where
      D: Deserializer<'de>
    {
      #[derive(Deserialize)]
      struct Wrapped(
        #[serde(with = "super")]
        DateTime<Utc>
      );

      let opt =
        Option::<Wrapped>::deserialize(
          deserializer
        )?;
      Ok(opt.map(|Wrapped(dt)| dt))
    }
  }
}
