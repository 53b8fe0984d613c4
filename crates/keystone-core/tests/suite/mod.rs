mod name_props;
