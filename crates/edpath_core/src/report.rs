use std::fmt;

use crate::algo::Route;

/// Table of a solved route: one row per waypoint with the hop from the
/// previous one and the distance still ahead, followed by search statistics.
pub struct RouteReport<'a> {
    route: &'a Route,
}

/// One rendered row of a [`RouteReport`].
#[derive(Clone, Debug, PartialEq)]
pub struct ReportRow {
    pub index: usize,
    pub label: String,
    pub name: String,
    pub hop: f64,
    pub remaining: f64,
}

impl<'a> RouteReport<'a> {
    pub fn new(route: &'a Route) -> Self {
        Self { route }
    }

    pub fn rows(&self) -> Vec<ReportRow> {
        let order = &self.route.order;
        let hops: Vec<f64> = std::iter::once(0.0)
            .chain(order.windows(2).map(|w| w[0].distance_to(&w[1])))
            .collect();
        let total: f64 = hops.iter().sum();

        let mut travelled = 0.0;
        order
            .iter()
            .zip(&hops)
            .enumerate()
            .map(|(index, (wp, &hop))| {
                travelled += hop;
                ReportRow {
                    index,
                    label: wp.display_label(),
                    name: wp.name().to_string(),
                    hop,
                    remaining: (total - travelled).max(0.0),
                }
            })
            .collect()
    }
}

impl fmt::Display for RouteReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self.rows();
        let label_w = rows.iter().map(|r| r.label.len()).max().unwrap_or(0).max(5);
        let name_w = rows.iter().map(|r| r.name.len()).max().unwrap_or(0).max(4);

        writeln!(
            f,
            "{:>3}  {:<label_w$}  {:<name_w$}  {:>10}  {:>10}",
            "#", "label", "name", "hop", "remaining"
        )?;
        for row in &rows {
            writeln!(
                f,
                "{:>3}  {:<label_w$}  {:<name_w$}  {:>10.2}  {:>10.2}",
                row.index, row.label, row.name, row.hop, row.remaining
            )?;
        }

        let route = self.route;
        let stats = route.stats;
        writeln!(f)?;
        writeln!(f, "length      {:.2}", route.length)?;
        writeln!(f, "as given    {:.2}", route.as_given_length)?;
        writeln!(f, "direct      {:.2}", route.direct_length)?;
        writeln!(f, "considered  {}", stats.considered)?;
        writeln!(f, "rejected    {}", stats.rejected)?;
        writeln!(f, "space       {}", route.space)?;
        match route.pruned_pct() {
            Some(pct) => writeln!(f, "pruned      {pct:.2}%")?,
            None => writeln!(f, "pruned      -")?,
        }
        writeln!(f, "memo hits   {}", stats.memo_hits)?;
        write!(
            f,
            "exact       {}",
            if route.approximate { "no (split heuristic)" } else { "yes" }
        )
    }
}
