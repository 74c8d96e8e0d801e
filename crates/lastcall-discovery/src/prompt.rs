use lastcall_core::GeoPosition;

/// How many outlets the upstream is asked for.
pub const OUTLET_COUNT: usize = 5;

/// Builds the fixed discovery prompt for `position`.
///
/// The requested layout (numbered entries, one labelled field per line, no
/// markdown) is exactly what [`crate::parser`] knows how to recover.
pub(crate) fn build_prompt(position: GeoPosition) -> String {
    format!(
        "Find the {OUTLET_COUNT} closest liquor stores, beer stores, or wine shops near these \
         coordinates: {lat}, {lng}.\n\
         Answer with a numbered list (1., 2., 3., ...), one entry per store, and put each \
         field on its own line exactly like this:\n\
         1. Name: <store name>\n\
         Address: <full street address>\n\
         Status: <Open or Closed right now>\n\
         Closing Time: <today's closing time, e.g. 9:00 PM>\n\
         Distance: <distance from the coordinates, if available>\n\
         Do not use markdown. Do not use asterisks, pound signs, underscores, bold text, or \
         headings. Do not add an introduction or a summary. \
         Use the latest data from Google Maps.",
        lat = position.latitude(),
        lng = position.longitude(),
    )
}
